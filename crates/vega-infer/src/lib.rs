//! The enum inference engine.
//!
//! Generated API documentation never declares enumerations, but related
//! integer constants are evidently used together as the legal values of a
//! parameter, return value, or field. This crate discovers those groups:
//! prefix clustering over constant names ([`create_enum_from_constants`]),
//! reconciliation of independently discovered groups ([`merge_enum`]),
//! free-text scanning of prose descriptions ([`infer_from_description`]),
//! an identifier-similarity fallback search ([`search_enum_by_name`]), and
//! the per-element orchestration that ties them together
//! ([`qualify_and_infer`]).
//!
//! The engine is a best-effort heuristic classifier, not a sound analyzer:
//! ambiguity is a result state surfaced through the report, and every entry
//! point degrades to the untouched raw type when its heuristics fail.

mod cluster;
mod describe;
mod resolve;
mod search;

pub use cluster::{create_enum_from_constants, merge_enum, EnumCandidate};
pub use describe::infer_from_description;
pub use resolve::{is_integer_shaped, qualify_and_infer, TypeResolution};
pub use search::search_enum_by_name;
