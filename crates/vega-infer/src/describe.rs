//! Free-text scanning of parameter/return/field prose for constant
//! references.

use std::collections::{BTreeMap, BTreeSet};

use vega_core::{to_const_case, InferenceConfig, Report, Warning};
use vega_model::{Api, ClassId, ConstId, EnumId};

use crate::cluster::create_enum_from_constants;

/// Scan one prose block describing a parameter, return value, or field.
///
/// Tokens shaped like constant references are matched against the global
/// constant table by suffix; the match set resolves against the declaring
/// classes in priority order (current class covers all tokens → single
/// unambiguous declaring class → any single class covering all tokens).
/// Anything else is an ambiguity, reported and then retried through the
/// naming-hint prefix search. `method_name` supplies the accessor-derived
/// hint, which always overrides the positional `name - description` one.
pub fn infer_from_description(
    api: &mut Api,
    class_id: ClassId,
    method_name: Option<&str>,
    text: &str,
    context: &str,
    config: &InferenceConfig,
    report: &mut Report,
) -> Option<EnumId> {
    let corrected = config.correct_prose(text);
    let mut tokens: Vec<&str> = corrected
        .split(|c: char| c.is_whitespace() || c == ',' || c == '*')
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .collect();

    // The `<name> - <description...>` convention yields a naming hint.
    let mut hint = None;
    if tokens.len() >= 2 && tokens[1] == "-" {
        let raw_hint = tokens[0];
        hint = Some(match &config.parameter_hint_cleanup {
            Some(cleanup) => cleanup.replace_all(raw_hint, "").into_owned(),
            None => raw_hint.to_owned(),
        });
        tokens.drain(..3.min(tokens.len()));
    }
    if let Some(method_name) = method_name {
        if let Some(accessor_hint) = config.accessor_hint(method_name) {
            hint = Some(accessor_hint);
        }
    }

    let distinct: BTreeSet<&str> = tokens
        .iter()
        .copied()
        .filter(|t| constant_shaped(t))
        .collect();

    // token -> matching constants, and declaring class -> matches.
    let mut by_token: BTreeMap<&str, Vec<ConstId>> = BTreeMap::new();
    let mut by_class: BTreeMap<String, BTreeSet<ConstId>> = BTreeMap::new();
    let mut token_classes: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for token in &distinct {
        for (id, constant) in api.constants() {
            if !constant.is_integer() || !suffix_matches(&constant.fqn, token) {
                continue;
            }
            by_token.entry(*token).or_default().push(id);
            by_class
                .entry(constant.class.clone())
                .or_default()
                .insert(id);
            token_classes
                .entry(*token)
                .or_default()
                .insert(constant.class.clone());
        }
    }

    let current_class = api.class(class_id).fqn.clone();
    let matched_tokens: Vec<&str> = by_token.keys().copied().collect();

    if !matched_tokens.is_empty() {
        // (a) The current class alone accounts for every matched token.
        if let Some(current) = by_class.get(&current_class) {
            let covered = matched_tokens
                .iter()
                .all(|t| token_classes[t].contains(&current_class));
            if covered {
                let cluster: Vec<ConstId> = current.iter().copied().collect();
                return create_enum_from_constants(
                    api, class_id, &cluster, hint.as_deref(), context, config, report,
                );
            }
        }

        // (b) One declaring class, and no token resolved ambiguously.
        if by_class.len() == 1 {
            let unambiguous = by_token.values().all(|matches| matches.len() == 1);
            if unambiguous {
                let (declaring, cluster) = by_class.iter().next().expect("len checked");
                let cluster: Vec<ConstId> = cluster.iter().copied().collect();
                let declaring_id = api.class_id(declaring);
                if let Some(declaring_id) = declaring_id {
                    return create_enum_from_constants(
                        api,
                        declaring_id,
                        &cluster,
                        hint.as_deref(),
                        context,
                        config,
                        report,
                    );
                }
            }
        }

        // (c) Some single declaring class covers all matched tokens.
        let covering = by_class.iter().find(|(class, _)| {
            matched_tokens
                .iter()
                .all(|t| token_classes[t].contains(*class))
        });
        if let Some((declaring, cluster)) = covering {
            let declaring = declaring.clone();
            let cluster: Vec<ConstId> = cluster.iter().copied().collect();
            if let Some(declaring_id) = api.class_id(&declaring) {
                return create_enum_from_constants(
                    api,
                    declaring_id,
                    &cluster,
                    hint.as_deref(),
                    context,
                    config,
                    report,
                );
            }
        }

        // (d) Unresolvable here; report and fall through to the hint pass.
        report.warn(Warning::AmbiguousDescription {
            class: current_class.clone(),
            context: context.to_owned(),
            candidate_classes: by_class.keys().cloned().collect(),
        });
    }

    // Hint pass: constants of the current class under `<class>.<HINT>`.
    let hint = hint?;
    let key = to_const_case(&hint, None);
    let cluster: Vec<ConstId> = api
        .constants_with_fqn_prefix(&format!("{current_class}.{key}"))
        .into_iter()
        .filter(|id| api.constant(*id).is_integer())
        .collect();
    if cluster.is_empty() {
        return None;
    }
    create_enum_from_constants(api, class_id, &cluster, Some(&hint), context, config, report)
}

/// A bare or dotted identifier whose final segment is an
/// uppercase/underscore/digit run, e.g. `PEN_TYPE_FINGER` or
/// `Pen.PEN_TYPE_FINGER`.
fn constant_shaped(token: &str) -> bool {
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
    {
        return false;
    }
    let Some(last) = token.rsplit('.').next() else {
        return false;
    };
    let mut chars = last.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_uppercase()
        && last
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && last.len() > 1
}

/// Suffix match on a word boundary: the name ends with `token`, preceded by
/// a `.` or `_` separator (or matches it entirely).
fn suffix_matches(fqn: &str, token: &str) -> bool {
    if fqn == token {
        return true;
    }
    let Some(head) = fqn.strip_suffix(token) else {
        return false;
    };
    head.ends_with('.') || head.ends_with('_')
}
