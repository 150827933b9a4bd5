//! The normalized API model: packages, classes, fields, methods, constants,
//! and the inferred enums wired into them.
//!
//! Everything lives in arenas owned by [`Api`], addressed by copyable ids.
//! Name-keyed registries are `BTreeMap`s so that every iteration that can
//! affect identity assignment is a stable, explicit order; reproducibility
//! across runs on identical input is a correctness requirement here, not a
//! nicety.

mod api;
mod model;
mod signature;
mod snapshot;

pub use api::{Api, OverrideError, QualifiedSlot, Slot};
pub use model::{
    Class, ClassKind, Const, ConstValue, EnumMember, Field, InferredEnum, Method, MethodKind,
    Package, Parameter,
};
pub use signature::method_signature;
pub use snapshot::{load_snapshot, save_snapshot, SnapshotError};

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a [`Const`] in the [`Api`] constant arena.
    ConstId
);
arena_id!(
    /// Index of a [`Class`] in the [`Api`] class arena.
    ClassId
);
arena_id!(
    /// Index of an [`InferredEnum`] in the [`Api`] enum arena. The global
    /// registry and the owning class's local set both hold this id, never a
    /// copy of the enum.
    EnumId
);

/// A method addressed by owning class and position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodId {
    pub class: ClassId,
    pub index: u32,
}
