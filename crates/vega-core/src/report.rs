use std::fmt;

/// Non-fatal findings collected while building the model.
///
/// Ambiguity is a result state, not a failure: the engine always produces a
/// best-effort model, and the report tells the operator where heuristics fell
/// back or disagreed. Warnings are also emitted through `tracing` as they are
/// recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub warnings: Vec<Warning>,
}

impl Report {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(target: "vega.infer", "{warning}");
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Report) {
        self.warnings.extend(other.warnings);
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A requested cluster had neither a common name prefix nor a usable
    /// naming hint; creation was skipped and the original type retained.
    NoDiscoverableName { class: String, context: String },
    /// A constant was claimed by a second, different enum identity. The claim
    /// is transferred, not silently aliased.
    ClaimConflict {
        constant: String,
        previous: String,
        claimed_by: String,
    },
    /// Two discoveries assigned different member names to the same value.
    /// The first-seen name is kept.
    MemberNameCollision {
        enum_name: String,
        value: i64,
        kept: String,
        rejected: String,
    },
    /// Two discoveries of the same group derived incompatible prefixes
    /// (neither a word-prefix of the other). The original identity is kept.
    PrefixConflict {
        enum_name: String,
        existing: String,
        incoming: String,
    },
    /// A description scan matched constants from several classes with no
    /// single covering set; resolution fell through to the name fallback.
    AmbiguousDescription {
        class: String,
        context: String,
        candidate_classes: Vec<String>,
    },
    /// A documentation section was absent for one class; that class simply
    /// contributes nothing for it.
    MissingSection { class: String, section: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoDiscoverableName { class, context } => {
                write!(f, "{class}: no discoverable enum name for {context}")
            }
            Warning::ClaimConflict {
                constant,
                previous,
                claimed_by,
            } => write!(
                f,
                "constant {constant} already claimed by {previous}, reclaimed by {claimed_by}"
            ),
            Warning::MemberNameCollision {
                enum_name,
                value,
                kept,
                rejected,
            } => write!(
                f,
                "{enum_name}: value {value} named both {kept} (kept) and {rejected}"
            ),
            Warning::PrefixConflict {
                enum_name,
                existing,
                incoming,
            } => write!(
                f,
                "{enum_name}: incompatible prefixes {existing} and {incoming}, keeping {existing}"
            ),
            Warning::AmbiguousDescription {
                class,
                context,
                candidate_classes,
            } => write!(
                f,
                "{class}: ambiguous constant references for {context} (candidates: {})",
                candidate_classes.join(", ")
            ),
            Warning::MissingSection { class, section } => {
                write!(f, "{class}: missing {section} section, skipped")
            }
        }
    }
}
