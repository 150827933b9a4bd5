//! The model assembler: turns a scraped [`DocumentSet`] into an enriched
//! [`Api`].
//!
//! Parsing order is packages, then the constant table, then class stubs,
//! then fields, then methods/constructors, so that every later pass can rely
//! on the registries the earlier passes filled. Iteration anywhere identity
//! is assigned uses an explicit sort; two assemblies of the same input
//! produce identical models and reports.

use std::collections::VecDeque;

use thiserror::Error;

use vega_core::{InferenceConfig, Report, Warning};
use vega_docs::{
    split_prototype, BlockKind, ClassKindRecord, ClassRecord, ConstLiteral, DocumentSet,
};
use vega_infer::qualify_and_infer;
use vega_model::{
    Api, Class, ClassId, ClassKind, Const, ConstValue, Field, Method, MethodKind, Parameter,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    /// The top-level package list is missing; parsing cannot proceed.
    #[error("document set has no package list")]
    MissingPackageList,
    /// The constant-values page is missing; parsing cannot proceed.
    #[error("document set has no constant table")]
    MissingConstantTable,
}

/// Assemble the full model.
///
/// Fatal errors are limited to the two required top-level inputs; everything
/// else degrades per class and surfaces in the report.
pub fn assemble(
    docs: &DocumentSet,
    config: &InferenceConfig,
) -> Result<(Api, Report), AssembleError> {
    if docs.packages.is_empty() {
        return Err(AssembleError::MissingPackageList);
    }
    let constant_table = docs
        .constants
        .as_ref()
        .ok_or(AssembleError::MissingConstantTable)?;

    let mut api = Api::new();
    let mut report = Report::default();

    let mut packages: Vec<_> = docs.packages.iter().collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    for package in &packages {
        api.add_package(&package.name);
    }

    collect_constants(&mut api, constant_table, config);

    // Class stubs, then a sorted worklist for the member passes.
    let mut worklist: Vec<(String, &ClassRecord)> = Vec::new();
    for package in &packages {
        let mut classes: Vec<_> = package.classes.iter().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        for class in classes {
            let fqn = format!("{}.{}", package.name, class.name);
            let kind = match class.kind {
                ClassKindRecord::Class => ClassKind::Class,
                ClassKindRecord::Interface => ClassKind::Interface,
            };
            api.add_class(Class::new(fqn.clone(), package.name.clone(), kind));
            worklist.push((fqn, class));
        }
    }
    worklist.sort_by(|a, b| a.0.cmp(&b.0));

    for (fqn, record) in &worklist {
        let class_id = api.class_id(fqn).expect("class registered above");
        assemble_fields(&mut api, class_id, record, config, &mut report);
    }
    for (fqn, record) in &worklist {
        let class_id = api.class_id(fqn).expect("class registered above");
        assemble_methods(&mut api, class_id, record, config, &mut report);
    }

    Ok((api, report))
}

fn collect_constants(api: &mut Api, table: &[vega_docs::ConstRecord], config: &InferenceConfig) {
    let mut records: Vec<_> = table.iter().collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));
    for record in records {
        let value = match &record.value {
            ConstLiteral::Int(v) => ConstValue::Int(*v),
            ConstLiteral::Str(_) if config.integer_constants_only => continue,
            ConstLiteral::Str(s) => ConstValue::Str(s.clone()),
        };
        let Some((class_fqn, short_name)) = record.name.rsplit_once('.') else {
            continue;
        };
        let package = api.package_of(&record.name).unwrap_or_default().to_owned();
        api.add_constant(Const {
            fqn: record.name.clone(),
            name: short_name.to_owned(),
            class: class_fqn.to_owned(),
            package,
            ty: record.ty.clone(),
            value,
            claimed_by: None,
            synthesized: false,
        });
    }
}

fn assemble_fields(
    api: &mut Api,
    class_id: ClassId,
    record: &ClassRecord,
    config: &InferenceConfig,
    report: &mut Report,
) {
    let class_fqn = api.class(class_id).fqn.clone();
    let Some(fields) = &record.fields else {
        report.warn(Warning::MissingSection {
            class: class_fqn,
            section: "field detail".to_owned(),
        });
        return;
    };

    let mut fields: Vec<_> = fields.iter().collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    // Synthesized values count up per class, in sorted field order.
    let mut next_synthesized: i64 = 0;

    for field in fields {
        let modifiers: Vec<String> = field
            .modifiers
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        let mut constant = field
            .constant
            .as_deref()
            .and_then(|fqn| api.constant_id(fqn));
        if constant.is_none() {
            constant = api.constant_id(&format!("{class_fqn}.{}", field.name));
        }
        if constant.is_none() && enum_bearing(&modifiers, &field.ty, &field.name) {
            // Present in the docs but absent from the constant table: invent
            // a sequential value so the group stays clusterable.
            let id = api.add_constant(Const {
                fqn: format!("{class_fqn}.{}", field.name),
                name: field.name.clone(),
                class: class_fqn.clone(),
                package: api.class(class_id).package.clone(),
                ty: field.ty.clone(),
                value: ConstValue::Int(next_synthesized),
                claimed_by: None,
                synthesized: true,
            });
            next_synthesized += 1;
            constant = Some(id);
        }

        let mut hints: VecDeque<String> = field.hints.clone().into();
        let (ty, raw_type, enum_ref) = if constant.is_some() {
            // The field is itself a raw enum-value constant; its type is
            // left alone.
            (field.ty.clone(), None, None)
        } else {
            let see_also = DocumentSet::block_of(&field.doc_blocks, BlockKind::SeeAlso)
                .map(|block| block.entries.join(", "));
            let context = format!("field {} of {class_fqn}", field.name);
            let resolved = qualify_and_infer(
                api,
                class_id,
                &field.name,
                &field.ty,
                &mut hints,
                see_also.as_deref(),
                None,
                &context,
                config,
                report,
            );
            (resolved.ty, resolved.raw, resolved.enum_ref)
        };

        api.class_mut(class_id).fields.push(Field {
            name: field.name.clone(),
            modifiers,
            ty,
            raw_type,
            enum_ref,
            constant,
        });
    }
}

/// A `static final` integer field named in constant case is an enum-value
/// constant even when the constant table forgot it.
fn enum_bearing(modifiers: &[String], ty: &str, name: &str) -> bool {
    modifiers.iter().any(|m| m == "static")
        && modifiers.iter().any(|m| m == "final")
        && matches!(ty, "int" | "long")
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn assemble_methods(
    api: &mut Api,
    class_id: ClassId,
    record: &ClassRecord,
    config: &InferenceConfig,
    report: &mut Report,
) {
    let class_fqn = api.class(class_id).fqn.clone();
    let class_name = api.class(class_id).name.clone();
    let Some(methods) = &record.methods else {
        report.warn(Warning::MissingSection {
            class: class_fqn,
            section: "method detail".to_owned(),
        });
        return;
    };

    let mut methods: Vec<_> = methods.iter().collect();
    methods.sort_by(|a, b| a.text.cmp(&b.text));

    for method in methods {
        let Some(proto) = split_prototype(&method.text) else {
            tracing::warn!(
                target: "vega.assemble",
                class = %class_fqn,
                text = %method.text,
                "unparseable prototype, skipped"
            );
            continue;
        };
        let kind = if proto.return_type.is_none() && proto.name == class_name {
            MethodKind::Constructor
        } else {
            MethodKind::Method
        };

        // Hints are consumed in source order: return type first, then
        // parameters left to right.
        let mut hints: VecDeque<String> = method.hints.clone().into();
        let params_block = DocumentSet::block_of(&method.doc_blocks, BlockKind::Parameters);
        let returns_block = DocumentSet::block_of(&method.doc_blocks, BlockKind::Returns);

        let return_resolution = proto.return_type.as_deref().map(|raw| {
            let description = returns_block
                .and_then(|block| block.entries.first())
                .map(String::as_str);
            let context = format!("return of {class_fqn}.{}", proto.name);
            qualify_and_infer(
                api,
                class_id,
                &proto.name,
                raw,
                &mut hints,
                description,
                Some(&proto.name),
                &context,
                config,
                report,
            )
        });

        let mut params = Vec::with_capacity(proto.params.len());
        for (index, (raw_ty, param_name)) in proto.params.iter().enumerate() {
            let description = params_block
                .and_then(|block| {
                    block
                        .entries
                        .iter()
                        .find(|entry| entry.split_whitespace().next() == Some(param_name.as_str()))
                })
                .map(String::as_str);
            let context = format!("parameter {param_name} of {class_fqn}.{}", proto.name);
            let resolved = qualify_and_infer(
                api,
                class_id,
                param_name,
                raw_ty,
                &mut hints,
                description,
                Some(&proto.name),
                &context,
                config,
                report,
            );
            params.push(Parameter {
                name: param_name.clone(),
                position: (index + 1) as u32,
                ty: resolved.ty,
                raw_type: resolved.raw,
                enum_ref: resolved.enum_ref,
            });
        }

        api.add_method(
            class_id,
            Method {
                kind,
                name: proto.name,
                modifiers: proto.modifiers,
                params,
                return_type: return_resolution.as_ref().map(|r| r.ty.clone()),
                return_raw: return_resolution.as_ref().and_then(|r| r.raw.clone()),
                return_enum: return_resolution.as_ref().and_then(|r| r.enum_ref),
                signature: String::new(),
            },
        );
    }
}
