//! Name-based descriptors emitted by the parser in place of live entities.

use serde::{Deserialize, Serialize};

use crate::batch::{FieldDef, MethodDef};
use crate::model::member::Modifiers;

pub fn field_signature(owner: &str, name: &str, field_type: &str) -> String {
    format!("{owner}.{name}:{field_type}")
}

pub fn method_signature(owner: &str, name: &str, descriptor: &str) -> String {
    format!("{owner}.{name}{descriptor}")
}

/// Splits a dotted FQCN into its package (if any) and simple name.
pub fn split_fqcn(fqcn: &str) -> (Option<&str>, &str) {
    match fqcn.rfind('.') {
        Some(i) => (Some(&fqcn[..i]), &fqcn[i + 1..]),
        None => (None, fqcn),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub field_type: String,
}

impl FieldRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    pub fn signature(&self) -> String {
        field_signature(&self.owner, &self.name, &self.field_type)
    }

    /// Placeholder definition for a field nobody declared.
    pub fn to_field(&self) -> FieldDef {
        FieldDef {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            modifiers: Modifiers::public(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    /// JVM-style descriptor, e.g. `(Ljava/lang/String;)V`.
    pub descriptor: String,
}

impl MethodRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn signature(&self) -> String {
        method_signature(&self.owner, &self.name, &self.descriptor)
    }

    /// Placeholder definition for a method nobody declared. It has no body.
    pub fn to_method(&self) -> MethodDef {
        MethodDef {
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
            modifiers: Modifiers::public(),
            blocks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        let field = FieldRef::new("com.app.A", "count", "I");
        let method = MethodRef::new("com.app.A", "foo", "()V");

        assert_eq!(field.signature(), "com.app.A.count:I");
        assert_eq!(method.signature(), "com.app.A.foo()V");
    }

    #[test]
    fn test_split_fqcn() {
        assert_eq!(split_fqcn("java.lang.String"), (Some("java.lang"), "String"));
        assert_eq!(split_fqcn("Main"), (None, "Main"));
    }

    #[test]
    fn test_placeholders_default_to_public() {
        let method = MethodRef::new("android.app.Activity", "onCreate", "(Landroid/os/Bundle;)V");
        let def = method.to_method();

        assert!(def.modifiers.is_not_private());
        assert!(def.blocks.is_empty());
        assert_eq!(def.signature("android.app.Activity"), method.signature());
    }
}
