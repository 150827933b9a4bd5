use crate::MethodKind;

/// Derive the canonical signature of a method or constructor.
///
/// The signature is the method's unique key in the class-level and global
/// indexes: `<class>.<name>(<param types>)`, with `-><return>` appended for
/// non-constructors. It must be recomputed (and both indexes re-keyed)
/// whenever any parameter or return type is replaced.
pub fn method_signature<'a>(
    class_fqn: &str,
    name: &str,
    kind: MethodKind,
    param_types: impl IntoIterator<Item = &'a str>,
    return_type: Option<&str>,
) -> String {
    let params: Vec<&str> = param_types.into_iter().collect();
    let mut signature = format!("{class_fqn}.{name}({})", params.join(","));
    if kind == MethodKind::Method {
        if let Some(ret) = return_type {
            signature.push_str("->");
            signature.push_str(ret);
        }
    }
    signature
}
