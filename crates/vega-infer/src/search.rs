//! Identifier-similarity fallback search, used when no prose was available
//! (or said nothing useful) but the type still looks enum-bearing.

use std::collections::{BTreeMap, BTreeSet};

use vega_core::{common_prefix, to_const_case, InferenceConfig, Report};
use vega_model::{Api, ClassId, ConstId, EnumId};

use crate::cluster::create_enum_from_constants;

/// Search for an enum whose constants share the element name's leading
/// words.
///
/// The search key is the upper-snake form of `element_name` with its final
/// word truncated (single-word names are kept whole, mirroring the
/// trailing-word rule of prefix computation). Tiers are tried in full, in
/// order: constants backing enum-bearing fields of the current class, then
/// all integer constants of the current package, then (when configured)
/// integer constants of sibling sub-packages. A tier succeeds only when its
/// candidates yield a non-degenerate common prefix.
pub fn search_enum_by_name(
    api: &mut Api,
    class_id: ClassId,
    element_name: &str,
    context: &str,
    config: &InferenceConfig,
    report: &mut Report,
) -> Option<EnumId> {
    let key = search_key(element_name, config);
    if key.is_empty() {
        return None;
    }

    // Tier: constants surfaced as fields of the current class.
    let field_constants: Vec<ConstId> = api
        .class(class_id)
        .fields
        .iter()
        .filter_map(|f| f.constant)
        .filter(|id| api.constant(*id).is_integer())
        .collect();
    if let Some(id) = try_tier(api, &field_constants, &key, context, config, report) {
        return Some(id);
    }

    // Tier: every integer constant of the current package.
    let package = api.class(class_id).package.clone();
    let package_constants = api.integer_constants_in_package(&package);
    if let Some(id) = try_tier(api, &package_constants, &key, context, config, report) {
        return Some(id);
    }

    // Tier: sibling sub-packages, when enabled.
    if config.search_sibling_packages {
        let sub_packages: Vec<String> =
            api.sub_packages(&package).iter().map(|p| (*p).to_owned()).collect();
        for sub in sub_packages {
            let constants = api.integer_constants_in_package(&sub);
            if let Some(id) = try_tier(api, &constants, &key, context, config, report) {
                return Some(id);
            }
        }
    }

    None
}

fn search_key(element_name: &str, config: &InferenceConfig) -> String {
    let full = to_const_case(element_name, config.parameter_hint_cleanup.as_ref());
    let words: Vec<&str> = full.split('_').filter(|w| !w.is_empty()).collect();
    match words.len() {
        0 => String::new(),
        1 => words[0].to_owned(),
        n => words[..n - 1].join("_"),
    }
}

/// Probe one tier: candidates are the tier's constants whose short name
/// starts with the key, grouped by declaring class (visited in name order).
/// The first class whose candidates carry a shared prefix wins.
fn try_tier(
    api: &mut Api,
    tier: &[ConstId],
    key: &str,
    context: &str,
    config: &InferenceConfig,
    report: &mut Report,
) -> Option<EnumId> {
    let mut by_class: BTreeMap<String, BTreeSet<ConstId>> = BTreeMap::new();
    for id in tier {
        let constant = api.constant(*id);
        if constant.name.starts_with(key) {
            by_class
                .entry(constant.class.clone())
                .or_default()
                .insert(*id);
        }
    }

    for (class, candidates) in by_class {
        let has_prefix = common_prefix(
            candidates.iter().map(|id| api.constant(*id).name.as_str()),
            &config.ignored_constants,
        )
        .is_some();
        if !has_prefix {
            continue;
        }
        let Some(declaring_id) = api.class_id(&class) else {
            continue;
        };
        let cluster: Vec<ConstId> = candidates.into_iter().collect();
        return create_enum_from_constants(
            api,
            declaring_id,
            &cluster,
            None,
            context,
            config,
            report,
        );
    }
    None
}
