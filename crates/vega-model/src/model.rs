use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConstId, EnumId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Member classes in registration (sorted-name) order.
    pub classes: Vec<crate::ClassId>,
    /// Member constants in registration (sorted-name) order.
    pub constants: Vec<ConstId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

/// A documented (or engine-synthesized) compile-time constant.
///
/// Created once during constant-table parsing, or lazily when a class field
/// is recognized as enum-bearing but absent from the global table. Never
/// deleted; only `claimed_by` mutates, through [`crate::Api::claim`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Const {
    pub fqn: String,
    pub name: String,
    pub class: String,
    pub package: String,
    pub ty: String,
    pub value: ConstValue,
    /// The enum that has consumed this constant, once one has.
    pub claimed_by: Option<EnumId>,
    /// True for engine-invented sequential values.
    pub synthesized: bool,
}

impl Const {
    pub fn is_integer(&self) -> bool {
        matches!(self.value, ConstValue::Int(_))
    }

    pub fn int_value(&self) -> Option<i64> {
        match self.value {
            ConstValue::Int(v) => Some(v),
            ConstValue::Str(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub fqn: String,
    pub name: String,
    pub package: String,
    pub kind: ClassKind,
    pub fields: Vec<Field>,
    /// Constructors and instance methods, in assembly (sorted) order.
    pub methods: Vec<Method>,
    /// Enums discovered "at" this class; ids into the shared arena.
    pub enums: Vec<EnumId>,
    /// Method-by-signature index, kept in lockstep with the global registry.
    pub(crate) by_signature: BTreeMap<String, u32>,
    /// How many overloads share each bare method name.
    pub(crate) overloads: BTreeMap<String, u32>,
}

impl Class {
    pub fn new(fqn: String, package: String, kind: ClassKind) -> Self {
        let name = fqn.rsplit('.').next().unwrap_or(&fqn).to_owned();
        Self {
            fqn,
            name,
            package,
            kind,
            fields: Vec::new(),
            methods: Vec::new(),
            enums: Vec::new(),
            by_signature: BTreeMap::new(),
            overloads: BTreeMap::new(),
        }
    }

    /// Bare method names carried by more than one overload. Emitters use
    /// this to decide when a bare name is not addressable.
    pub fn ambiguous_overloads(&self) -> impl Iterator<Item = &str> {
        self.overloads
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(name, _)| name.as_str())
    }

    pub fn method_index(&self, signature: &str) -> Option<u32> {
        self.by_signature.get(signature).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub modifiers: Vec<String>,
    /// Resolved type; an enum's fully-qualified name once inference ran.
    pub ty: String,
    /// Original raw type text, kept only when resolution changed it.
    pub raw_type: Option<String>,
    pub enum_ref: Option<EnumId>,
    /// Set when the field itself is a raw enum-value constant.
    pub constant: Option<ConstId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Method,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub kind: MethodKind,
    pub name: String,
    pub modifiers: Vec<String>,
    pub params: Vec<Parameter>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub return_raw: Option<String>,
    pub return_enum: Option<EnumId>,
    /// Canonical signature; the unique method key. Derived, and recomputed
    /// whenever any parameter or return type is replaced.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// 1-based declaration position.
    pub position: u32,
    /// Resolved type; an enum's fully-qualified name once inference ran.
    pub ty: String,
    /// Original raw type text, kept only when resolution changed it.
    pub raw_type: Option<String>,
    pub enum_ref: Option<EnumId>,
}

/// A named group of constant/value pairs the engine believes represents one
/// logical enumeration.
///
/// Within one enum every value maps to exactly one member name; a second
/// discovery disagreeing on a value's name is a reported conflict and the
/// first-seen name wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredEnum {
    pub class: String,
    pub package: String,
    /// Short name: the joined prefix words, e.g. `PEN_TYPE`.
    pub name: String,
    /// `<owning class>.<name>`; the registry key.
    pub fqn: String,
    pub members: BTreeMap<i64, EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub constant: ConstId,
    pub name: String,
}

impl InferredEnum {
    pub fn new(class: &str, package: &str, name: &str) -> Self {
        Self {
            class: class.to_owned(),
            package: package.to_owned(),
            name: name.to_owned(),
            fqn: format!("{class}.{name}"),
            members: BTreeMap::new(),
        }
    }

    /// The prefix words the name was built from.
    pub fn name_words(&self) -> Vec<&str> {
        self.name.split('_').collect()
    }
}
