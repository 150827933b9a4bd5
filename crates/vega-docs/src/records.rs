use serde::{Deserialize, Serialize};

/// Everything the scraper extracted from one documentation tree.
///
/// `constants` mirrors the documentation's single constant-values page; its
/// absence (as opposed to emptiness) means the page was missing, which is
/// fatal to assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub packages: Vec<PackageRecord>,
    pub constants: Option<Vec<ConstRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Dotted package name, e.g. `com.x.draw`.
    pub name: String,
    pub classes: Vec<ClassRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKindRecord {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Short class name; the package record supplies the qualifier.
    pub name: String,
    pub kind: ClassKindRecord,
    /// `None` when the class page had no field-detail section.
    #[serde(default)]
    pub fields: Option<Vec<FieldRecord>>,
    /// `None` when the class page had no method/constructor-detail section.
    #[serde(default)]
    pub methods: Option<Vec<MethodRecord>>,
}

/// One row of the constant-values page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstRecord {
    /// Fully-qualified constant name, e.g. `com.x.Pen.PEN_TYPE_FINGER`.
    pub name: String,
    /// Declared type as printed, e.g. `int` or `java.lang.String`.
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ConstLiteral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstLiteral {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Raw modifier text, e.g. `public static final`.
    pub modifiers: String,
    /// Raw declared type text.
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
    /// Fully-qualified name of the constant this field declares, when the
    /// field detail linked into the constant-values page.
    #[serde(default)]
    pub constant: Option<String>,
    #[serde(default)]
    pub doc_blocks: Vec<DocBlock>,
    /// Packages of hyperlinked types in the declaration, in source order.
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Raw prototype text, e.g.
    /// `public void setPenType(int penType, Pen pen)`.
    pub text: String,
    #[serde(default)]
    pub doc_blocks: Vec<DocBlock>,
    /// Packages of hyperlinked types in the prototype, in source order
    /// (return type first, then parameters).
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocBlock {
    pub kind: BlockKind,
    /// One entry per documented item: each parameter line of a
    /// `Parameters:` block, the single `Returns:` description, or each
    /// `See Also:` reference.
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Parameters,
    Returns,
    SeeAlso,
}

impl DocumentSet {
    /// The `Parameters:`/`Returns:`/`See Also:` block of `kind`, if present.
    pub fn block_of<'a>(blocks: &'a [DocBlock], kind: BlockKind) -> Option<&'a DocBlock> {
        blocks.iter().find(|b| b.kind == kind)
    }
}
