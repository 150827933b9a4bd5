//! Prefix clustering and merge of independently discovered enums.

use std::collections::BTreeSet;

use vega_core::{common_prefix, to_const_case, InferenceConfig, Report, Warning, WordPrefix};
use vega_model::{Api, ClassId, ConstId, EnumId, InferredEnum};

/// A discovered-but-unregistered enum: identity plus derived member names.
///
/// Candidates are what discovery sites hand to [`merge_enum`]; only the merge
/// decides whether a candidate becomes a new registry entry or folds into an
/// existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCandidate {
    pub class: String,
    pub package: String,
    pub name: String,
    /// `(value, constant, member name)` in constant-name order.
    pub entries: Vec<(i64, ConstId, String)>,
}

impl EnumCandidate {
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }

    fn prefix(&self) -> WordPrefix {
        WordPrefix::new(self.name.split('_').map(str::to_owned).collect())
    }
}

/// Build an enum from a set of constants of one class.
///
/// The shared name prefix drives both the enum's name and the member names.
/// When a prefix exists, the global constant table is re-queried for every
/// constant under `<class>.<prefix>`, recovering members the triggering
/// prose never mentioned; growth re-derives the prefix, which may shrink.
/// With no prefix, `hint` (converted to const case) names the group and
/// members keep their full constant names. With neither, creation is skipped
/// and reported.
pub fn create_enum_from_constants(
    api: &mut Api,
    class_id: ClassId,
    constants: &[ConstId],
    hint: Option<&str>,
    context: &str,
    config: &InferenceConfig,
    report: &mut Report,
) -> Option<EnumId> {
    let class_fqn = api.class(class_id).fqn.clone();
    let package = api.class(class_id).package.clone();

    let mut members: BTreeSet<ConstId> = constants
        .iter()
        .copied()
        .filter(|id| api.constant(*id).is_integer())
        .collect();
    if members.is_empty() {
        return None;
    }

    let mut prefix = prefix_of(api, &members, config);

    if let Some(found) = &prefix {
        let recall_key = format!("{class_fqn}.{}", found.joined());
        let before = members.len();
        for id in api.constants_with_fqn_prefix(&recall_key) {
            if api.constant(id).is_integer() {
                members.insert(id);
            }
        }
        if members.len() != before {
            prefix = prefix_of(api, &members, config);
        }
    }

    let candidate = match prefix {
        None => {
            let Some(hint) = hint else {
                report.warn(Warning::NoDiscoverableName {
                    class: class_fqn,
                    context: context.to_owned(),
                });
                return None;
            };
            // Hint-named group: members keep their full constant names.
            let name = to_const_case(hint, None);
            let entries = members
                .iter()
                .map(|id| {
                    let constant = api.constant(*id);
                    (
                        constant.int_value().expect("members are integer-typed"),
                        *id,
                        constant.name.clone(),
                    )
                })
                .collect();
            EnumCandidate {
                class: class_fqn,
                package,
                name,
                entries,
            }
        }
        Some(prefix) => {
            let name = prefix.joined();
            let strip = format!("{name}_");
            let entries = members
                .iter()
                .map(|id| {
                    let constant = api.constant(*id);
                    let member_name = if config.ignored_constants.contains(&constant.name) {
                        constant.name.clone()
                    } else {
                        match constant.name.strip_prefix(&strip) {
                            Some(rest) if !rest.is_empty() => rest.to_owned(),
                            _ => constant.name.clone(),
                        }
                    };
                    (
                        constant.int_value().expect("members are integer-typed"),
                        *id,
                        member_name,
                    )
                })
                .collect();
            EnumCandidate {
                class: class_fqn,
                package,
                name,
                entries,
            }
        }
    };

    Some(merge_enum(api, candidate, report))
}

fn prefix_of(api: &Api, members: &BTreeSet<ConstId>, config: &InferenceConfig) -> Option<WordPrefix> {
    common_prefix(
        members.iter().map(|id| api.constant(*id).name.as_str()),
        &config.ignored_constants,
    )
}

/// Reconcile a candidate with the registry.
///
/// A merge partner is an existing entry under the candidate's
/// fully-qualified name, or failing that, the enum already claiming one of
/// the candidate's constants (independent discoveries of one group derive
/// different-length prefixes, so their names need not match). The shorter
/// prefix wins: the longer side's identity or member names are re-derived
/// against it. Incompatible prefixes are reported and the original identity
/// kept. Member maps are unioned by value; name disagreements keep the
/// first-seen name.
pub fn merge_enum(api: &mut Api, candidate: EnumCandidate, report: &mut Report) -> EnumId {
    let member_ids: Vec<ConstId> = candidate.entries.iter().map(|(_, id, _)| *id).collect();
    let partner = api
        .enum_id(&candidate.fqn())
        .or_else(|| api.enum_claiming_any(&member_ids));

    let Some(partner) = partner else {
        let new_enum = InferredEnum::new(&candidate.class, &candidate.package, &candidate.name);
        let id = api.register_enum(new_enum, report);
        for (value, constant, name) in candidate.entries {
            api.add_enum_member(id, value, constant, name, report);
        }
        return id;
    };

    let existing_prefix = {
        let existing = api.inferred_enum(partner);
        WordPrefix::new(existing.name.split('_').map(str::to_owned).collect())
    };
    let candidate_prefix = candidate.prefix();
    let mut entries = candidate.entries;

    if candidate_prefix == existing_prefix {
        // Same identity; nothing to re-derive.
    } else if candidate_prefix.is_word_prefix_of(&existing_prefix) {
        // The candidate found the shorter, more general prefix: rename the
        // existing enum and re-prepend the words it no longer subsumes to
        // every member discovered under the longer prefix.
        let dropped = existing_prefix.words()[candidate_prefix.word_count()..].join("_");
        let renamed: Vec<(i64, String)> = api
            .inferred_enum(partner)
            .members
            .iter()
            .map(|(value, member)| {
                let full_name = api.constant(member.constant).name == member.name;
                let name = if full_name {
                    member.name.clone()
                } else {
                    format!("{dropped}_{}", member.name)
                };
                (*value, name)
            })
            .collect();
        api.set_enum_member_names(partner, renamed);
        api.rename_enum(partner, &candidate.name);
    } else if existing_prefix.is_word_prefix_of(&candidate_prefix) {
        // The existing entry already holds the shorter prefix: re-derive the
        // candidate's member names against it before the union.
        let extra = candidate_prefix.words()[existing_prefix.word_count()..].join("_");
        for (_, constant, name) in entries.iter_mut() {
            if api.constant(*constant).name != *name {
                *name = format!("{extra}_{name}");
            }
        }
    } else {
        let existing = api.inferred_enum(partner);
        report.warn(Warning::PrefixConflict {
            enum_name: existing.fqn.clone(),
            existing: existing.name.clone(),
            incoming: candidate.name.clone(),
        });
    }

    for (value, constant, name) in entries {
        api.add_enum_member(partner, value, constant, name, report);
    }
    partner
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vega_model::{Class, ClassKind, Const, ConstValue};

    fn api_with_class(class: &str) -> (Api, ClassId) {
        let mut api = Api::new();
        let package = class.rsplit_once('.').unwrap().0;
        api.add_package(package);
        let id = api.add_class(Class::new(
            class.to_owned(),
            package.to_owned(),
            ClassKind::Class,
        ));
        (api, id)
    }

    fn int_const(api: &mut Api, class: &str, name: &str, value: i64) -> ConstId {
        api.add_constant(Const {
            fqn: format!("{class}.{name}"),
            name: name.to_owned(),
            class: class.to_owned(),
            package: class.rsplit_once('.').unwrap().0.to_owned(),
            ty: "int".to_owned(),
            value: ConstValue::Int(value),
            claimed_by: None,
            synthesized: false,
        })
    }

    fn member_names(api: &Api, id: EnumId) -> Vec<(i64, String)> {
        api.inferred_enum(id)
            .members
            .iter()
            .map(|(value, member)| (*value, member.name.clone()))
            .collect()
    }

    #[test]
    fn clusters_a_shared_prefix() {
        let (mut api, class) = api_with_class("com.x.Pen");
        let consts = vec![
            int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0),
            int_const(&mut api, "com.x.Pen", "PEN_TYPE_STYLUS", 1),
            int_const(&mut api, "com.x.Pen", "PEN_TYPE_ERASER", 2),
        ];
        let mut report = Report::default();

        let id =
            create_enum_from_constants(&mut api, class, &consts, None, "test", &InferenceConfig::new(), &mut report)
                .unwrap();

        let created = api.inferred_enum(id);
        assert_eq!(created.fqn, "com.x.Pen.PEN_TYPE");
        assert_eq!(
            member_names(&api, id),
            vec![
                (0, "FINGER".to_owned()),
                (1, "STYLUS".to_owned()),
                (2, "ERASER".to_owned()),
            ]
        );
        assert!(report.is_empty());
        for constant in consts {
            assert_eq!(api.constant(constant).claimed_by, Some(id));
        }
    }

    #[test]
    fn degenerate_singleton_uses_its_first_word() {
        let (mut api, class) = api_with_class("com.x.Widget");
        let constant = int_const(&mut api, "com.x.Widget", "MODE_DEFAULT", 0);
        let mut report = Report::default();

        let id = create_enum_from_constants(
            &mut api,
            class,
            &[constant],
            None,
            "test",
            &InferenceConfig::new(),
            &mut report,
        )
        .unwrap();

        assert_eq!(api.inferred_enum(id).fqn, "com.x.Widget.MODE");
        assert_eq!(member_names(&api, id), vec![(0, "DEFAULT".to_owned())]);
    }

    #[test]
    fn recall_recovers_unmentioned_siblings() {
        let (mut api, class) = api_with_class("com.x.Pen");
        let finger = int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0);
        let stylus = int_const(&mut api, "com.x.Pen", "PEN_TYPE_STYLUS", 1);
        int_const(&mut api, "com.x.Pen", "PEN_TYPE_ERASER", 2);
        let mut report = Report::default();

        // Only two of the three siblings were mentioned in prose.
        let id = create_enum_from_constants(
            &mut api,
            class,
            &[finger, stylus],
            None,
            "test",
            &InferenceConfig::new(),
            &mut report,
        )
        .unwrap();

        assert_eq!(
            member_names(&api, id),
            vec![
                (0, "FINGER".to_owned()),
                (1, "STYLUS".to_owned()),
                (2, "ERASER".to_owned()),
            ]
        );
    }

    #[test]
    fn no_prefix_and_no_hint_aborts_with_a_warning() {
        let (mut api, class) = api_with_class("com.x.Sdk");
        let consts = vec![
            int_const(&mut api, "com.x.Sdk", "FEATURE_CAMERA", 0),
            int_const(&mut api, "com.x.Sdk", "MODE_DEFAULT", 1),
        ];
        let mut report = Report::default();

        let got = create_enum_from_constants(
            &mut api,
            class,
            &consts,
            None,
            "parameter flags",
            &InferenceConfig::new(),
            &mut report,
        );
        assert_eq!(got, None);
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            Warning::NoDiscoverableName { class, .. } if class == "com.x.Sdk"
        ));
    }

    #[test]
    fn hint_names_the_group_and_members_keep_full_names() {
        let (mut api, class) = api_with_class("com.x.Sdk");
        let consts = vec![
            int_const(&mut api, "com.x.Sdk", "FEATURE_CAMERA", 0),
            int_const(&mut api, "com.x.Sdk", "MODE_DEFAULT", 1),
        ];
        let mut report = Report::default();

        let id = create_enum_from_constants(
            &mut api,
            class,
            &consts,
            Some("penType"),
            "test",
            &InferenceConfig::new(),
            &mut report,
        )
        .unwrap();

        assert_eq!(api.inferred_enum(id).fqn, "com.x.Sdk.PEN_TYPE");
        assert_eq!(
            member_names(&api, id),
            vec![
                (0, "FEATURE_CAMERA".to_owned()),
                (1, "MODE_DEFAULT".to_owned()),
            ]
        );
    }

    #[test]
    fn ignored_constants_join_without_constraining_the_prefix() {
        let (mut api, class) = api_with_class("com.x.Pen");
        let consts = vec![
            int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0),
            int_const(&mut api, "com.x.Pen", "PEN_TYPE_STYLUS", 1),
            int_const(&mut api, "com.x.Pen", "UNKNOWN", 9),
        ];
        let config = InferenceConfig::new().ignore_constant("UNKNOWN");
        let mut report = Report::default();

        let id =
            create_enum_from_constants(&mut api, class, &consts, None, "test", &config, &mut report)
                .unwrap();

        assert_eq!(api.inferred_enum(id).fqn, "com.x.Pen.PEN_TYPE");
        assert_eq!(
            member_names(&api, id),
            vec![
                (0, "FINGER".to_owned()),
                (1, "STYLUS".to_owned()),
                (9, "UNKNOWN".to_owned()),
            ]
        );
    }

    #[test]
    fn shorter_prefix_wins_and_reprefixes_existing_members() {
        let (mut api, class) = api_with_class("com.x.Pen");
        let finger = int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0);
        let stylus = int_const(&mut api, "com.x.Pen", "PEN_TYPE_STYLUS", 1);
        let config = InferenceConfig::new();
        let mut report = Report::default();

        let first = create_enum_from_constants(
            &mut api,
            class,
            &[finger, stylus],
            None,
            "first",
            &config,
            &mut report,
        )
        .unwrap();
        assert_eq!(api.inferred_enum(first).fqn, "com.x.Pen.PEN_TYPE");

        // A later run saw PEN_WIDTH_THIN too, deriving the shorter prefix.
        let thin = int_const(&mut api, "com.x.Pen", "PEN_WIDTH_THIN", 7);
        let second = create_enum_from_constants(
            &mut api,
            class,
            &[finger, stylus, thin],
            None,
            "second",
            &config,
            &mut report,
        )
        .unwrap();

        assert_eq!(second, first, "both views must share one instance");
        let merged = api.inferred_enum(first);
        assert_eq!(merged.fqn, "com.x.Pen.PEN");
        assert_eq!(api.enum_id("com.x.Pen.PEN_TYPE"), None);
        assert_eq!(
            member_names(&api, first),
            vec![
                (0, "TYPE_FINGER".to_owned()),
                (1, "TYPE_STYLUS".to_owned()),
                (7, "WIDTH_THIN".to_owned()),
            ]
        );
    }

    #[test]
    fn longer_incoming_prefix_folds_into_the_shorter_identity() {
        let (mut api, class) = api_with_class("com.x.Pen");
        let finger = int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0);
        let thin = int_const(&mut api, "com.x.Pen", "PEN_WIDTH_THIN", 7);
        let config = InferenceConfig::new();
        let mut report = Report::default();

        let first = create_enum_from_constants(
            &mut api,
            class,
            &[finger, thin],
            None,
            "first",
            &config,
            &mut report,
        )
        .unwrap();
        assert_eq!(api.inferred_enum(first).fqn, "com.x.Pen.PEN");

        let stylus = int_const(&mut api, "com.x.Pen", "PEN_TYPE_STYLUS", 1);
        let second = create_enum_from_constants(
            &mut api,
            class,
            &[finger, stylus],
            None,
            "second",
            &config,
            &mut report,
        )
        .unwrap();

        assert_eq!(second, first);
        assert_eq!(api.inferred_enum(first).fqn, "com.x.Pen.PEN");
        assert_eq!(
            member_names(&api, first),
            vec![
                (0, "TYPE_FINGER".to_owned()),
                (1, "TYPE_STYLUS".to_owned()),
                (7, "WIDTH_THIN".to_owned()),
            ]
        );
    }

    #[test]
    fn disagreeing_member_names_surface_a_conflict_and_keep_the_first() {
        let (mut api, _class) = api_with_class("com.x.Pen");
        let finger = int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0);
        let digit = int_const(&mut api, "com.x.Pen", "PEN_TYPE_DIGIT", 0);
        let mut report = Report::default();

        let first = merge_enum(
            &mut api,
            EnumCandidate {
                class: "com.x.Pen".to_owned(),
                package: "com.x".to_owned(),
                name: "PEN_TYPE".to_owned(),
                entries: vec![(0, finger, "FINGER".to_owned())],
            },
            &mut report,
        );
        let second = merge_enum(
            &mut api,
            EnumCandidate {
                class: "com.x.Pen".to_owned(),
                package: "com.x".to_owned(),
                name: "PEN_TYPE".to_owned(),
                entries: vec![(0, digit, "DIGIT".to_owned())],
            },
            &mut report,
        );

        assert_eq!(first, second);
        assert_eq!(member_names(&api, first), vec![(0, "FINGER".to_owned())]);
        assert_eq!(
            report.warnings,
            vec![Warning::MemberNameCollision {
                enum_name: "com.x.Pen.PEN_TYPE".to_owned(),
                value: 0,
                kept: "FINGER".to_owned(),
                rejected: "DIGIT".to_owned(),
            }]
        );
    }

    #[test]
    fn incompatible_prefixes_keep_the_original_identity() {
        let (mut api, _class) = api_with_class("com.x.Pen");
        let finger = int_const(&mut api, "com.x.Pen", "PEN_TYPE_FINGER", 0);
        let mut report = Report::default();

        let first = merge_enum(
            &mut api,
            EnumCandidate {
                class: "com.x.Pen".to_owned(),
                package: "com.x".to_owned(),
                name: "PEN_TYPE".to_owned(),
                entries: vec![(0, finger, "FINGER".to_owned())],
            },
            &mut report,
        );
        // Same constant rediscovered under an unrelated equal-length name.
        let second = merge_enum(
            &mut api,
            EnumCandidate {
                class: "com.x.Pen".to_owned(),
                package: "com.x".to_owned(),
                name: "TOOL_KIND".to_owned(),
                entries: vec![(0, finger, "FINGER".to_owned()), (1, finger, "ALT".to_owned())],
            },
            &mut report,
        );

        assert_eq!(first, second);
        assert_eq!(api.inferred_enum(first).fqn, "com.x.Pen.PEN_TYPE");
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::PrefixConflict { .. })));
    }
}
