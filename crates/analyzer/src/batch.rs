//! Parser output: one [`ClassUnit`] per source unit, collected into a
//! [`BatchDatabase`] for one analysis run.
//!
//! Units only know names. Superclass and interfaces are plain strings and
//! every instruction operand is an unresolved reference.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use database::Collection;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::reference::{field_signature, method_signature};
use crate::model::{Instruction, InstructionBlock, Modifiers};

pub(crate) fn fingerprint<T: Hash>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Constant initializer, if the unit declares one.
    #[serde(default)]
    pub value: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            modifiers: Modifiers::default(),
            value: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn signature(&self, owner: &str) -> String {
        field_signature(owner, &self.name, &self.field_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub blocks: Vec<InstructionBlock>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            modifiers: Modifiers::default(),
            blocks: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_block(mut self, block: InstructionBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Appends a single unlabeled block holding `instructions`.
    pub fn with_instructions(self, instructions: Vec<Instruction>) -> Self {
        self.with_block(InstructionBlock::new(instructions))
    }

    pub fn signature(&self, owner: &str) -> String {
        method_signature(owner, &self.name, &self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassUnit {
    pub fqcn: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub source_file: Option<String>,
}

impl ClassUnit {
    pub fn new(fqcn: impl Into<String>) -> Self {
        Self {
            fqcn: fqcn.into(),
            modifiers: Modifiers::public(),
            extends: None,
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
        }
    }

    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.extends = Some(superclass.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }
}

/// Transient set of freshly parsed classes, merged into the accumulated
/// program database by one analysis run.
#[derive(Debug, Clone, Default)]
pub struct BatchDatabase {
    pub source: Option<PathBuf>,
    pub classes: Collection<ClassUnit>,
}

impl BatchDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: impl AsRef<Path>) -> Self {
        Self {
            source: Some(source.as_ref().to_path_buf()),
            classes: Collection::new(),
        }
    }

    /// Adds a unit. A second unit with the same FQCN replaces the first.
    pub fn add_class(&mut self, unit: ClassUnit) {
        let fqcn = unit.fqcn.clone();
        if self.classes.insert(fqcn.clone(), unit).is_some() {
            warn!(fqcn = %fqcn, "Class defined twice in the same batch, keeping the last definition");
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassUnit> for BatchDatabase {
    fn from_iter<I: IntoIterator<Item = ClassUnit>>(iter: I) -> Self {
        let mut batch = BatchDatabase::new();
        for unit in iter {
            batch.add_class(unit);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldRef, Instruction, Link, Operand};

    #[test]
    fn test_fingerprint_tracks_content() {
        let read = Instruction::new(
            "sget",
            Operand::FieldAccess(crate::model::FieldAccess {
                kind: crate::model::AccessKind::Get,
                is_static: true,
                target: Link::Unresolved(FieldRef::new("com.app.A", "x", "I")),
            }),
        );
        let a = MethodDef::new("run", "()V").with_instructions(vec![read.clone()]);
        let b = MethodDef::new("run", "()V").with_instructions(vec![read]);
        let c = MethodDef::new("run", "()V");

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_add_class_keeps_last_definition() {
        let mut batch = BatchDatabase::with_source("/tmp/app");
        batch.add_class(ClassUnit::new("com.app.A"));
        batch.add_class(ClassUnit::new("com.app.A").extending("com.app.Base"));

        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.classes.get("com.app.A").and_then(|u| u.extends.as_deref()),
            Some("com.app.Base")
        );
    }

    #[test]
    fn test_unit_deserializes_with_defaults() {
        let json = r#"{
            "fqcn": "com.app.Main",
            "extends": "java.lang.Object",
            "methods": [{
                "name": "main",
                "descriptor": "([Ljava/lang/String;)V",
                "modifiers": { "visibility": "Public", "is_static": true },
                "blocks": [{ "instructions": [
                    { "opcode": "const-string", "registers": ["v0"], "operand": { "StringLiteral": "hello" } },
                    { "opcode": "return-void", "operand": "Nop" }
                ]}]
            }]
        }"#;

        let unit: ClassUnit = serde_json::from_str(json).expect("unit should deserialize");

        assert_eq!(unit.fqcn, "com.app.Main");
        assert_eq!(unit.extends.as_deref(), Some("java.lang.Object"));
        assert!(unit.fields.is_empty());
        assert!(unit.methods[0].modifiers.is_static);
        assert_eq!(unit.methods[0].blocks[0].instructions.len(), 2);
    }
}
