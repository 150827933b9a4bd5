use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vega_core::{Report, Warning};

use crate::model::{Class, Const, EnumMember, InferredEnum, Method, Package};
use crate::signature::method_signature;
use crate::{ClassId, ConstId, EnumId, MethodId};

/// The assembled model: arenas plus name-keyed registries.
///
/// Enums are owned by the arena alone; the global registry and each owning
/// class's local set hold ids into it, so both views always observe the same
/// instance after a merge. Method signatures are derived values, re-keyed in
/// the class-level and global indexes inside the same mutation that changes a
/// type; no lookup ever sees a stale key.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Api {
    consts: Vec<Const>,
    classes: Vec<Class>,
    enums: Vec<InferredEnum>,
    packages: BTreeMap<String, Package>,
    const_table: BTreeMap<String, ConstId>,
    class_table: BTreeMap<String, ClassId>,
    enum_registry: BTreeMap<String, EnumId>,
    method_registry: BTreeMap<String, MethodId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    #[error("no method with signature {0}")]
    UnknownSignature(String),
    #[error("{signature} has no parameter at position {position}")]
    NoSuchParameter { signature: String, position: u32 },
    #[error("{0} is a constructor and has no return type")]
    NoReturnType(String),
}

/// A parameter-or-return position whose type was enum-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedSlot {
    pub signature: String,
    pub slot: Slot,
    pub enum_fqn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Return,
    /// 1-based parameter position.
    Param(u32),
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- packages ----

    pub fn add_package(&mut self, name: &str) {
        self.packages.entry(name.to_owned()).or_insert_with(|| Package {
            name: name.to_owned(),
            ..Package::default()
        });
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// The longest registered package that is a dotted prefix of `fqn`.
    pub fn package_of(&self, fqn: &str) -> Option<&str> {
        let mut candidate = fqn;
        while let Some((prefix, _)) = candidate.rsplit_once('.') {
            if let Some((name, _)) = self.packages.get_key_value(prefix) {
                return Some(name);
            }
            candidate = prefix;
        }
        None
    }

    /// Registered packages nested under `package` (its sub-packages).
    pub fn sub_packages(&self, package: &str) -> Vec<&str> {
        let prefix = format!("{package}.");
        self.packages
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    // ---- classes ----

    pub fn add_class(&mut self, class: Class) -> ClassId {
        if let Some(existing) = self.class_table.get(&class.fqn) {
            return *existing;
        }
        let id = ClassId::new(self.classes.len());
        self.class_table.insert(class.fqn.clone(), id);
        if let Some(package) = self.packages.get_mut(&class.package) {
            package.classes.push(id);
        }
        self.classes.push(class);
        id
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub fn class_id(&self, fqn: &str) -> Option<ClassId> {
        self.class_table.get(fqn).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.class_table.values().map(|id| (*id, self.class(*id)))
    }

    // ---- constants ----

    /// Register a constant, keyed by fully-qualified name. Re-registering an
    /// existing name returns the original id; constants are never replaced.
    pub fn add_constant(&mut self, constant: Const) -> ConstId {
        if let Some(existing) = self.const_table.get(&constant.fqn) {
            return *existing;
        }
        let id = ConstId::new(self.consts.len());
        self.const_table.insert(constant.fqn.clone(), id);
        if let Some(package) = self.packages.get_mut(&constant.package) {
            package.constants.push(id);
        }
        self.consts.push(constant);
        id
    }

    pub fn constant(&self, id: ConstId) -> &Const {
        &self.consts[id.index()]
    }

    pub fn constant_id(&self, fqn: &str) -> Option<ConstId> {
        self.const_table.get(fqn).copied()
    }

    /// All constants, in fully-qualified-name order.
    pub fn constants(&self) -> impl Iterator<Item = (ConstId, &Const)> {
        self.const_table.values().map(|id| (*id, self.constant(*id)))
    }

    /// Constants whose fully-qualified name starts with `prefix`, in name
    /// order.
    pub fn constants_with_fqn_prefix(&self, prefix: &str) -> Vec<ConstId> {
        self.const_table
            .range(prefix.to_owned()..)
            .take_while(|(fqn, _)| fqn.starts_with(prefix))
            .map(|(_, id)| *id)
            .collect()
    }

    /// Integer constants registered to `package`, in registration order
    /// (which assembly keeps sorted).
    pub fn integer_constants_in_package(&self, package: &str) -> Vec<ConstId> {
        let Some(package) = self.packages.get(package) else {
            return Vec::new();
        };
        package
            .constants
            .iter()
            .copied()
            .filter(|id| self.constant(*id).is_integer())
            .collect()
    }

    /// Transfer or establish a constant's claim. Claiming a constant already
    /// held by a different enum identity is reported, then honored.
    pub fn claim(&mut self, const_id: ConstId, enum_id: EnumId, report: &mut Report) {
        let previous = self.consts[const_id.index()].claimed_by;
        if previous == Some(enum_id) {
            return;
        }
        if let Some(previous) = previous {
            report.warn(Warning::ClaimConflict {
                constant: self.consts[const_id.index()].fqn.clone(),
                previous: self.enums[previous.index()].fqn.clone(),
                claimed_by: self.enums[enum_id.index()].fqn.clone(),
            });
        }
        self.consts[const_id.index()].claimed_by = Some(enum_id);
    }

    // ---- enums ----

    /// Register a new enum: arena, global registry, and the owning class's
    /// local set, all pointing at one instance. Members present on `new_enum`
    /// are claimed for it.
    pub fn register_enum(&mut self, new_enum: InferredEnum, report: &mut Report) -> EnumId {
        debug_assert!(
            !self.enum_registry.contains_key(&new_enum.fqn),
            "register_enum on an existing key must go through merge"
        );
        let id = EnumId::new(self.enums.len());
        self.enum_registry.insert(new_enum.fqn.clone(), id);
        if let Some(class_id) = self.class_id(&new_enum.class) {
            self.classes[class_id.index()].enums.push(id);
        }
        let members: Vec<ConstId> = new_enum.members.values().map(|m| m.constant).collect();
        self.enums.push(new_enum);
        for constant in members {
            self.claim(constant, id, report);
        }
        id
    }

    pub fn inferred_enum(&self, id: EnumId) -> &InferredEnum {
        &self.enums[id.index()]
    }

    pub fn enum_id(&self, fqn: &str) -> Option<EnumId> {
        self.enum_registry.get(fqn).copied()
    }

    /// All enums, in fully-qualified-name order.
    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &InferredEnum)> {
        self.enum_registry
            .values()
            .map(|id| (*id, self.inferred_enum(*id)))
    }

    /// The enum already claiming any of `constants`, scanning in the given
    /// order. This is how independent discoveries of the same group find
    /// each other when their derived names differ.
    pub fn enum_claiming_any(&self, constants: &[ConstId]) -> Option<EnumId> {
        constants
            .iter()
            .find_map(|id| self.constant(*id).claimed_by)
    }

    /// Change an enum's identity, re-keying the global registry. Member
    /// names are the caller's concern; class-local sets hold ids and need no
    /// update.
    pub fn rename_enum(&mut self, id: EnumId, new_name: &str) {
        let entry = &mut self.enums[id.index()];
        let new_fqn = format!("{}.{new_name}", entry.class);
        let old_fqn = std::mem::replace(&mut entry.fqn, new_fqn);
        entry.name = new_name.to_owned();
        self.enum_registry.remove(&old_fqn);
        self.enum_registry.insert(self.enums[id.index()].fqn.clone(), id);
    }

    /// Replace member names wholesale. Used when a merge re-derives names
    /// against a shorter prefix; values absent from `names` keep theirs.
    pub fn set_enum_member_names(&mut self, id: EnumId, names: impl IntoIterator<Item = (i64, String)>) {
        let entry = &mut self.enums[id.index()];
        for (value, name) in names {
            if let Some(member) = entry.members.get_mut(&value) {
                member.name = name;
            }
        }
    }

    /// Insert one value/member pair, keeping the first-seen name on
    /// disagreement (reported) and claiming the constant on insertion.
    pub fn add_enum_member(
        &mut self,
        id: EnumId,
        value: i64,
        constant: ConstId,
        name: String,
        report: &mut Report,
    ) {
        let entry = &mut self.enums[id.index()];
        match entry.members.get(&value) {
            Some(existing) => {
                if existing.name != name {
                    let warning = Warning::MemberNameCollision {
                        enum_name: entry.fqn.clone(),
                        value,
                        kept: existing.name.clone(),
                        rejected: name,
                    };
                    report.warn(warning);
                }
            }
            None => {
                entry.members.insert(value, EnumMember { constant, name });
                self.claim(constant, id, report);
            }
        }
    }

    // ---- methods ----

    /// Add a method to its class, deriving the canonical signature and
    /// populating the class-level and global indexes plus the overload
    /// histogram.
    pub fn add_method(&mut self, class_id: ClassId, mut method: Method) -> MethodId {
        let class = &mut self.classes[class_id.index()];
        method.signature = method_signature(
            &class.fqn,
            &method.name,
            method.kind,
            method.params.iter().map(|p| p.ty.as_str()),
            method.return_type.as_deref(),
        );
        let index = class.methods.len() as u32;
        class.by_signature.insert(method.signature.clone(), index);
        *class.overloads.entry(method.name.clone()).or_insert(0) += 1;
        let id = MethodId {
            class: class_id,
            index,
        };
        self.method_registry.insert(method.signature.clone(), id);
        class.methods.push(method);
        id
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.classes[id.class.index()].methods[id.index as usize]
    }

    pub fn method_by_signature(&self, signature: &str) -> Option<MethodId> {
        self.method_registry.get(signature).copied()
    }

    /// Replace a parameter's type with an explicit enum reference,
    /// re-deriving the signature and updating the parameter list, the class
    /// index, and the global registry in one mutation. Returns the new
    /// signature.
    pub fn override_parameter_type(
        &mut self,
        signature: &str,
        position: u32,
        enum_id: EnumId,
    ) -> Result<String, OverrideError> {
        let id = self
            .method_by_signature(signature)
            .ok_or_else(|| OverrideError::UnknownSignature(signature.to_owned()))?;
        self.override_parameter_type_at(id, position, enum_id)
    }

    pub fn override_parameter_type_at(
        &mut self,
        id: MethodId,
        position: u32,
        enum_id: EnumId,
    ) -> Result<String, OverrideError> {
        let enum_fqn = self.enums[enum_id.index()].fqn.clone();
        let method = &mut self.classes[id.class.index()].methods[id.index as usize];
        let param = method
            .params
            .iter_mut()
            .find(|p| p.position == position)
            .ok_or_else(|| OverrideError::NoSuchParameter {
                signature: method.signature.clone(),
                position,
            })?;
        if param.raw_type.is_none() && param.ty != enum_fqn {
            param.raw_type = Some(param.ty.clone());
        }
        param.ty = enum_fqn;
        param.enum_ref = Some(enum_id);
        Ok(self.reindex_method(id))
    }

    /// Replace a method's return type with an explicit enum reference; same
    /// re-indexing contract as [`Api::override_parameter_type`].
    pub fn override_return_type(
        &mut self,
        signature: &str,
        enum_id: EnumId,
    ) -> Result<String, OverrideError> {
        let id = self
            .method_by_signature(signature)
            .ok_or_else(|| OverrideError::UnknownSignature(signature.to_owned()))?;
        let enum_fqn = self.enums[enum_id.index()].fqn.clone();
        let method = &mut self.classes[id.class.index()].methods[id.index as usize];
        if method.return_type.is_none() {
            return Err(OverrideError::NoReturnType(method.signature.clone()));
        }
        let current = method.return_type.as_ref().expect("checked above");
        if method.return_raw.is_none() && *current != enum_fqn {
            method.return_raw = Some(current.clone());
        }
        method.return_type = Some(enum_fqn);
        method.return_enum = Some(enum_id);
        Ok(self.reindex_method(id))
    }

    fn reindex_method(&mut self, id: MethodId) -> String {
        let class = &mut self.classes[id.class.index()];
        let class_fqn = class.fqn.clone();
        let method = &mut class.methods[id.index as usize];
        let new_signature = method_signature(
            &class_fqn,
            &method.name,
            method.kind,
            method.params.iter().map(|p| p.ty.as_str()),
            method.return_type.as_deref(),
        );
        let old_signature = std::mem::replace(&mut method.signature, new_signature.clone());
        class.by_signature.remove(&old_signature);
        class.by_signature.insert(new_signature.clone(), id.index);
        self.method_registry.remove(&old_signature);
        self.method_registry.insert(new_signature.clone(), id);
        new_signature
    }

    // ---- emitter views ----

    /// Enums owned by classes of packages matching `pattern` (a glob over
    /// package names), in fully-qualified-name order.
    pub fn enums_in_packages(&self, pattern: &str) -> Result<Vec<EnumId>, globset::Error> {
        let matcher = globset::Glob::new(pattern)?.compile_matcher();
        Ok(self
            .enum_registry
            .values()
            .copied()
            .filter(|id| matcher.is_match(&self.enums[id.index()].package))
            .collect())
    }

    /// Every (signature, slot) pair of `class` whose type was
    /// enum-qualified, in signature order.
    pub fn enum_qualified_slots(&self, class_id: ClassId) -> Vec<QualifiedSlot> {
        let class = self.class(class_id);
        let mut slots = Vec::new();
        for index in class.by_signature.values() {
            let method = &class.methods[*index as usize];
            if let Some(enum_id) = method.return_enum {
                slots.push(QualifiedSlot {
                    signature: method.signature.clone(),
                    slot: Slot::Return,
                    enum_fqn: self.enums[enum_id.index()].fqn.clone(),
                });
            }
            for param in &method.params {
                if let Some(enum_id) = param.enum_ref {
                    slots.push(QualifiedSlot {
                        signature: method.signature.clone(),
                        slot: Slot::Param(param.position),
                        enum_fqn: self.enums[enum_id.index()].fqn.clone(),
                    });
                }
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassKind, ConstValue, MethodKind, Parameter};
    use pretty_assertions::assert_eq;

    fn test_api() -> (Api, ClassId) {
        let mut api = Api::new();
        api.add_package("com.x");
        let class_id = api.add_class(Class::new(
            "com.x.Pen".to_owned(),
            "com.x".to_owned(),
            ClassKind::Class,
        ));
        (api, class_id)
    }

    fn int_const(api: &mut Api, fqn: &str, value: i64) -> ConstId {
        let name = fqn.rsplit('.').next().unwrap().to_owned();
        let class = fqn.rsplit_once('.').unwrap().0.to_owned();
        api.add_constant(Const {
            fqn: fqn.to_owned(),
            name,
            class,
            package: "com.x".to_owned(),
            ty: "int".to_owned(),
            value: ConstValue::Int(value),
            claimed_by: None,
            synthesized: false,
        })
    }

    #[test]
    fn reclaiming_under_a_different_identity_is_reported_and_honored() {
        let (mut api, _) = test_api();
        let c = int_const(&mut api, "com.x.Pen.PEN_TYPE_FINGER", 0);
        let mut report = Report::default();

        let first = api.register_enum(
            InferredEnum::new("com.x.Pen", "com.x", "PEN_TYPE"),
            &mut report,
        );
        let second = api.register_enum(
            InferredEnum::new("com.x.Pen", "com.x", "OTHER"),
            &mut report,
        );

        api.claim(c, first, &mut report);
        assert!(report.is_empty());
        api.claim(c, first, &mut report);
        assert!(report.is_empty(), "re-claiming the same identity is silent");

        api.claim(c, second, &mut report);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(api.constant(c).claimed_by, Some(second));
    }

    #[test]
    fn member_name_collisions_keep_the_first_name() {
        let (mut api, _) = test_api();
        let a = int_const(&mut api, "com.x.Pen.PEN_TYPE_FINGER", 0);
        let b = int_const(&mut api, "com.x.Pen.PEN_TYPE_DIGIT", 0);
        let mut report = Report::default();

        let id = api.register_enum(
            InferredEnum::new("com.x.Pen", "com.x", "PEN_TYPE"),
            &mut report,
        );
        api.add_enum_member(id, 0, a, "FINGER".to_owned(), &mut report);
        api.add_enum_member(id, 0, b, "DIGIT".to_owned(), &mut report);

        assert_eq!(api.inferred_enum(id).members[&0].name, "FINGER");
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
    fn override_leaves_no_stale_signature_key() {
        let (mut api, class_id) = test_api();
        let mut report = Report::default();
        let enum_id = api.register_enum(
            InferredEnum::new("com.x.Pen", "com.x", "PEN_TYPE"),
            &mut report,
        );

        let method = Method {
            kind: MethodKind::Method,
            name: "setPenType".to_owned(),
            modifiers: vec!["public".to_owned()],
            params: vec![Parameter {
                name: "penType".to_owned(),
                position: 1,
                ty: "int".to_owned(),
                raw_type: None,
                enum_ref: None,
            }],
            return_type: Some("void".to_owned()),
            return_raw: None,
            return_enum: None,
            signature: String::new(),
        };
        let id = api.add_method(class_id, method);
        let old_signature = api.method(id).signature.clone();
        assert_eq!(old_signature, "com.x.Pen.setPenType(int)->void");

        let new_signature = api
            .override_parameter_type(&old_signature, 1, enum_id)
            .unwrap();
        assert_eq!(
            new_signature,
            "com.x.Pen.setPenType(com.x.Pen.PEN_TYPE)->void"
        );
        assert_eq!(api.method_by_signature(&old_signature), None);
        assert_eq!(api.method_by_signature(&new_signature), Some(id));
        assert_eq!(api.class(class_id).method_index(&old_signature), None);
        assert_eq!(
            api.class(class_id).method_index(&new_signature),
            Some(id.index)
        );

        let method = api.method(id);
        assert_eq!(method.params[0].raw_type.as_deref(), Some("int"));
        assert_eq!(method.params[0].enum_ref, Some(enum_id));
    }

    #[test]
    fn rename_rekeys_the_registry() {
        let (mut api, class_id) = test_api();
        let mut report = Report::default();
        let id = api.register_enum(
            InferredEnum::new("com.x.Pen", "com.x", "PEN_TYPE"),
            &mut report,
        );

        api.rename_enum(id, "PEN");
        assert_eq!(api.enum_id("com.x.Pen.PEN_TYPE"), None);
        assert_eq!(api.enum_id("com.x.Pen.PEN"), Some(id));
        // The class-local view aliases the renamed instance.
        assert_eq!(api.class(class_id).enums, vec![id]);
        assert_eq!(api.inferred_enum(id).name, "PEN");
    }

    #[test]
    fn package_queries() {
        let mut api = Api::new();
        api.add_package("com.x");
        api.add_package("com.x.draw");
        api.add_package("com.x.io");

        assert_eq!(api.package_of("com.x.draw.Pen.PEN_TYPE_A"), Some("com.x.draw"));
        assert_eq!(api.package_of("org.other.Thing"), None);
        assert_eq!(api.sub_packages("com.x"), vec!["com.x.draw", "com.x.io"]);
    }
}
