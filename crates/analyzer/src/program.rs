//! The accumulated program database: arenas owning every entity plus the
//! keyed collections and append-only indices built over them.

use database::{Arena, Collection, Index};

use crate::batch::{FieldDef, MethodDef};
use crate::model::{
    Call, Class, ClassId, Field, FieldId, FieldView, Link, Member, MemberView, Method, MethodId,
    MethodView, MissingEntity, Package, PackageId, StringValue, TagCategory, UnlinkedInstruction,
};

#[derive(Debug, Clone)]
pub struct ProgramDatabase {
    pub(crate) class_arena: Arena<ClassId, Class>,
    pub(crate) field_arena: Arena<FieldId, Field>,
    pub(crate) method_arena: Arena<MethodId, Method>,
    pub(crate) package_arena: Arena<PackageId, Package>,

    /// FQCN -> class.
    pub(crate) classes: Collection<ClassId>,
    /// Field signature -> view. Inherited lookups add entries under the requesting signature.
    pub(crate) fields: Collection<FieldView>,
    pub(crate) methods: Collection<MethodView>,
    /// Dotted package name -> package.
    pub(crate) packages: Collection<PackageId>,

    pub(crate) call: Index<Call>,
    pub(crate) strings: Index<StringValue>,
    pub(crate) missing: Index<MissingEntity>,
    pub(crate) parse_errors: Index<UnlinkedInstruction>,

    pub(crate) tag_categories: Collection<TagCategory>,
}

impl Default for ProgramDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramDatabase {
    pub fn new() -> Self {
        Self {
            class_arena: Arena::new("class"),
            field_arena: Arena::new("field"),
            method_arena: Arena::new("method"),
            package_arena: Arena::new("package"),
            classes: Collection::new(),
            fields: Collection::new(),
            methods: Collection::new(),
            packages: Collection::new(),
            call: Index::new("call"),
            strings: Index::new("strings"),
            missing: Index::new("missing"),
            parse_errors: Index::new("parseErrors"),
            tag_categories: Collection::new(),
        }
    }

    pub fn class(&self, id: ClassId) -> &Class {
        self.class_arena.get(id)
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut Class {
        self.class_arena.get_mut(id)
    }

    pub fn field(&self, id: FieldId) -> &Field {
        self.field_arena.get(id)
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> &mut Field {
        self.field_arena.get_mut(id)
    }

    pub fn method(&self, id: MethodId) -> &Method {
        self.method_arena.get(id)
    }

    pub(crate) fn method_mut(&mut self, id: MethodId) -> &mut Method {
        self.method_arena.get_mut(id)
    }

    pub fn package(&self, id: PackageId) -> &Package {
        self.package_arena.get(id)
    }

    pub fn class_by_name(&self, fqcn: &str) -> Option<ClassId> {
        self.classes.get(fqcn).copied()
    }

    pub fn package_by_name(&self, name: &str) -> Option<PackageId> {
        self.packages.get(name).copied()
    }

    pub fn field_view(&self, signature: &str) -> Option<FieldView> {
        self.fields.get(signature).copied()
    }

    pub fn method_view(&self, signature: &str) -> Option<MethodView> {
        self.methods.get(signature).copied()
    }

    pub fn classes(&self) -> &Collection<ClassId> {
        &self.classes
    }

    pub fn fields(&self) -> &Collection<FieldView> {
        &self.fields
    }

    pub fn methods(&self) -> &Collection<MethodView> {
        &self.methods
    }

    pub fn packages(&self) -> &Collection<PackageId> {
        &self.packages
    }

    pub fn calls(&self) -> &Index<Call> {
        &self.call
    }

    pub fn strings(&self) -> &Index<StringValue> {
        &self.strings
    }

    pub fn missing(&self) -> &Index<MissingEntity> {
        &self.missing
    }

    pub fn parse_errors(&self) -> &Index<UnlinkedInstruction> {
        &self.parse_errors
    }

    pub fn tag_categories(&self) -> &Collection<TagCategory> {
        &self.tag_categories
    }

    pub fn all_classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.class_arena.iter()
    }

    pub fn all_fields(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.field_arena.iter()
    }

    pub fn all_methods(&self) -> impl Iterator<Item = (MethodId, &Method)> {
        self.method_arena.iter()
    }

    pub fn all_packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.package_arena.iter()
    }

    /// Name of the declared superclass, resolved or not.
    pub fn superclass_name(&self, id: ClassId) -> Option<String> {
        match self.class(id).extends.as_ref()? {
            Link::Resolved(parent) => Some(self.class(*parent).fqcn.clone()),
            Link::Unresolved(reference) => Some(reference.name.clone()),
        }
    }

    /// Superclass as a class of this database, looking unresolved names up without creating anything.
    pub(crate) fn superclass_of(&self, id: ClassId) -> Option<ClassId> {
        match self.class(id).extends.as_ref()? {
            Link::Resolved(parent) => Some(*parent),
            Link::Unresolved(reference) => self.class_by_name(&reference.name),
        }
    }

    pub(crate) fn ensure_package(&mut self, name: &str) -> PackageId {
        if let Some(id) = self.package_by_name(name) {
            return id;
        }
        let id = self.package_arena.alloc(Package::new(name));
        self.packages.insert(name, id);
        id
    }

    /// Files `class` under its package (derived from the FQCN), creating the package if needed.
    pub(crate) fn attach_to_package(&mut self, class: ClassId) -> Option<PackageId> {
        let name = self.class(class).package_name()?.to_string();
        let package = self.ensure_package(&name);
        self.package_arena.get_mut(package).append_child(class);
        self.class_mut(class).package = Some(Link::Resolved(package));
        Some(package)
    }

    /// Registers an empty class known only by name, with its package. An
    /// existing class is returned untouched.
    pub fn add_class(&mut self, fqcn: &str) -> ClassId {
        if let Some(id) = self.class_by_name(fqcn) {
            return id;
        }
        let id = self.class_arena.alloc(Class::from_fqcn(fqcn));
        self.classes.insert(fqcn, id);
        self.attach_to_package(id);
        id
    }

    /// Attaches a new field to `owner` and indexes it under its own signature.
    /// The own table is searched before inherited views, so this also shadows
    /// anything `owner` used to inherit under the same signature.
    pub(crate) fn register_field(&mut self, owner: ClassId, def: FieldDef) -> FieldId {
        let fqcn = self.class(owner).fqcn.clone();
        let signature = def.signature(&fqcn);
        let id = self.field_arena.alloc(Field::from_def(def, owner, &fqcn));

        self.class_mut(owner).fields.insert(signature.clone(), id);
        self.fields.insert(signature, MemberView::direct(id, owner));
        id
    }

    pub(crate) fn register_method(&mut self, owner: ClassId, def: MethodDef) -> MethodId {
        let fqcn = self.class(owner).fqcn.clone();
        let signature = def.signature(&fqcn);
        let id = self.method_arena.alloc(Method::from_def(def, owner, &fqcn));

        self.class_mut(owner).methods.insert(signature.clone(), id);
        self.methods.insert(signature, MemberView::direct(id, owner));
        id
    }

    /// Empties the inherited view tables of `class` and retracts the global
    /// index entries that still point at those views. Returns how many views were dropped.
    pub(crate) fn forget_inherited(&mut self, class: ClassId) -> usize {
        let target = self.class_mut(class);
        let fields = std::mem::take(&mut target.inherited_fields);
        let methods = std::mem::take(&mut target.inherited_methods);
        let dropped = fields.len() + methods.len();

        for (signature, view) in fields {
            if self.fields.get(&signature) == Some(&view) {
                self.fields.remove(&signature);
            }
        }
        for (signature, view) in methods {
            if self.methods.get(&signature) == Some(&view) {
                self.methods.remove(&signature);
            }
        }
        dropped
    }

    pub fn is_missing(&self, entity: MissingEntity) -> bool {
        match entity {
            MissingEntity::Class(id) => self.class(id).is_missing(),
            MissingEntity::Field(id) => self.field(id).is_missing(),
            MissingEntity::Method(id) => self.method(id).is_missing(),
        }
    }

    /// Retracts the `missing` audit entry of an entity that just received its real definition.
    pub(crate) fn clear_missing(&mut self, entity: MissingEntity) {
        match entity {
            MissingEntity::Class(id) => self.class_mut(id).tags.set_missing(false),
            MissingEntity::Field(id) => self.field_mut(id).tags.set_missing(false),
            MissingEntity::Method(id) => self.method_mut(id).tags.set_missing(false),
        }
        self.missing.retain(|m| *m != entity);
    }
}
