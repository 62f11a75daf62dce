use database::Collection;

use crate::batch::ClassUnit;
use crate::model::member::Modifiers;
use crate::model::reference::{TypeRef, split_fqcn};
use crate::model::tags::Tags;
use crate::model::{
    ClassId, FieldId, FieldView, Link, MethodId, MethodView, PackageLink, TypeLink,
};

#[derive(Debug, Clone)]
pub struct Class {
    pub fqcn: String,
    pub simple_name: String,
    pub package: Option<PackageLink>,
    pub modifiers: Modifiers,
    pub extends: Option<TypeLink>,
    pub implements: Vec<TypeLink>,
    /// Own members, signature -> member.
    pub fields: Collection<FieldId>,
    pub methods: Collection<MethodId>,
    /// Members surfaced through inheritance, keyed by the signature they were requested under.
    pub inherited_fields: Collection<FieldView>,
    pub inherited_methods: Collection<MethodView>,
    /// Linearized superclass chain, nearest first.
    pub supers: Vec<ClassId>,
    /// Methods using this class as a bare type.
    pub callers: Vec<MethodId>,
    pub source_file: Option<String>,
    pub tags: Tags,
}

impl Class {
    /// Bare class with no members and no hierarchy, as known from its name alone.
    pub fn from_fqcn(fqcn: &str) -> Self {
        let (package, simple_name) = split_fqcn(fqcn);
        Self {
            fqcn: fqcn.to_string(),
            simple_name: simple_name.to_string(),
            package: package.map(|name| Link::Unresolved(name.to_string())),
            modifiers: Modifiers::public(),
            extends: None,
            implements: Vec::new(),
            fields: Collection::new(),
            methods: Collection::new(),
            inherited_fields: Collection::new(),
            inherited_methods: Collection::new(),
            supers: Vec::new(),
            callers: Vec::new(),
            source_file: None,
            tags: Tags::default(),
        }
    }

    /// Header of a parsed unit: identity and declared hierarchy as plain names.
    /// Members are attached by the merger.
    pub(crate) fn from_unit(unit: &ClassUnit) -> Self {
        let mut class = Self::from_fqcn(&unit.fqcn);
        class.modifiers = unit.modifiers;
        class.extends = unit
            .extends
            .as_ref()
            .map(|name| Link::Unresolved(TypeRef::new(name.clone())));
        class.implements = unit
            .implements
            .iter()
            .map(|name| Link::Unresolved(TypeRef::new(name.clone())))
            .collect();
        class.source_file = unit.source_file.clone();
        class
    }

    pub fn package_name(&self) -> Option<&str> {
        split_fqcn(&self.fqcn).0
    }

    pub fn is_missing(&self) -> bool {
        self.tags.is_missing()
    }

    pub fn superclass(&self) -> Option<ClassId> {
        self.extends.as_ref().and_then(Link::resolved)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.implements.iter().filter_map(Link::resolved)
    }
}

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub children: Vec<ClassId>,
    pub tags: Tags,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            tags: Tags::default(),
        }
    }

    /// Appends `class` unless it is already a child. Returns whether it was added.
    pub fn append_child(&mut self, class: ClassId) -> bool {
        if self.children.contains(&class) {
            return false;
        }
        self.children.push(class);
        true
    }
}
