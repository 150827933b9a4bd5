//! The document model contract between the external HTML scraper and the
//! Vega assembler.
//!
//! The scraper walks generated API documentation (package index, per-class
//! pages, the constant-values page) and dumps a [`DocumentSet`] of
//! already-tokenized records. This crate defines those records, loads a
//! dumped set from JSON, and splits raw method prototype text. It knows
//! nothing about inference.

mod load;
mod prototype;
mod records;

pub use load::{load_document_set, DocLoadError};
pub use prototype::{split_prototype, Prototype};
pub use records::{
    BlockKind, ClassKindRecord, ClassRecord, ConstLiteral, ConstRecord, DocBlock, DocumentSet,
    FieldRecord, MethodRecord, PackageRecord,
};
