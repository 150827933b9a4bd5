//! Per-element orchestration: qualify the raw type, then try inference.

use std::collections::VecDeque;

use vega_core::{qualify_type, InferenceConfig, Report};
use vega_model::{Api, ClassId, EnumId};

use crate::describe::infer_from_description;
use crate::search::search_enum_by_name;

/// The outcome of resolving one parameter/return/field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeResolution {
    /// Resolved type text; an enum's fully-qualified name when inference
    /// succeeded.
    pub ty: String,
    /// The original raw type, kept only when resolution changed it.
    pub raw: Option<String>,
    pub enum_ref: Option<EnumId>,
}

impl TypeResolution {
    fn plain(raw_type: &str, qualified: String) -> Self {
        let raw = (qualified != raw_type).then(|| raw_type.to_owned());
        Self {
            ty: qualified,
            raw,
            enum_ref: None,
        }
    }
}

/// Qualify `raw_type` against the owning class and, for integer-shaped
/// types, attempt enum inference.
///
/// `description` is the role-matching documentation block (a `Parameters:`
/// entry, the `Returns:` text, or a field's `See Also:` line) when one was
/// located; without one, or when the scan finds nothing, the
/// name-similarity fallback runs on `element_name`. Names matching the
/// configured exclusion pattern, and non-integer types, are returned
/// qualified but untouched.
pub fn qualify_and_infer(
    api: &mut Api,
    class_id: ClassId,
    element_name: &str,
    raw_type: &str,
    hints: &mut VecDeque<String>,
    description: Option<&str>,
    method_name: Option<&str>,
    context: &str,
    config: &InferenceConfig,
    report: &mut Report,
) -> TypeResolution {
    let owning_package = api.class(class_id).package.clone();
    let qualified = qualify_type(raw_type, &owning_package, hints);

    if config.is_excluded_parameter(element_name) || !is_integer_shaped(&qualified) {
        return TypeResolution::plain(raw_type, qualified);
    }

    let found = description
        .and_then(|text| {
            infer_from_description(api, class_id, method_name, text, context, config, report)
        })
        .or_else(|| {
            // For a return slot the element is the method itself; search on
            // the accessor-stripped name when there is one.
            let search_name = match method_name {
                Some(m) if m == element_name => {
                    config.accessor_hint(m).unwrap_or_else(|| m.to_owned())
                }
                _ => element_name.to_owned(),
            };
            search_enum_by_name(api, class_id, &search_name, context, config, report)
        });

    match found {
        Some(enum_id) => TypeResolution {
            ty: api.inferred_enum(enum_id).fqn.clone(),
            raw: Some(raw_type.to_owned()),
            enum_ref: Some(enum_id),
        },
        None => TypeResolution::plain(raw_type, qualified),
    }
}

/// Whether a (possibly qualified) type can plausibly carry enum values: a
/// bare integer primitive, a boxed integer, or a generic parameterized by a
/// boxed integer.
pub fn is_integer_shaped(ty: &str) -> bool {
    let ty = ty.trim();
    if let Some(open) = ty.find('<') {
        let close = ty.rfind('>').unwrap_or(ty.len());
        let inner = &ty[open + 1..close];
        return inner.split(',').any(|arg| is_boxed_integer(arg.trim()));
    }
    matches!(ty, "int" | "long") || is_boxed_integer(ty)
}

fn is_boxed_integer(ty: &str) -> bool {
    matches!(ty, "Integer" | "Long") || ty.ends_with(".Integer") || ty.ends_with(".Long")
}
