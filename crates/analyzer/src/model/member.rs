use serde::{Deserialize, Serialize};

use crate::batch::{FieldDef, MethodDef, fingerprint};
use crate::model::instruction::{Instruction, InstructionBlock};
use crate::model::reference::{field_signature, method_signature};
use crate::model::tags::Tags;
use crate::model::usage::MethodUsage;
use crate::model::{ClassId, FieldId, MethodId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_synthetic: bool,
}

impl Modifiers {
    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            ..Default::default()
        }
    }

    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            ..Default::default()
        }
    }

    pub fn protected() -> Self {
        Self {
            visibility: Visibility::Protected,
            ..Default::default()
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Anything but `private` is visible to subclasses.
    pub fn is_not_private(&self) -> bool {
        self.visibility != Visibility::Private
    }
}

/// A member as seen from one class.
///
/// The global signature indices store views rather than bare handles: looking
/// up an inherited member through a subclass yields a view whose
/// `enclosing_class` is the subclass and whose `declaring_class` is the class
/// that actually holds the member. The shared member itself is never re-homed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberView<H> {
    pub member: H,
    pub enclosing_class: ClassId,
    pub declaring_class: ClassId,
}

impl<H> MemberView<H> {
    pub fn direct(member: H, owner: ClassId) -> Self {
        Self {
            member,
            enclosing_class: owner,
            declaring_class: owner,
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.enclosing_class != self.declaring_class
    }
}

pub type FieldView = MemberView<FieldId>;
pub type MethodView = MemberView<MethodId>;

/// Shared surface of fields and methods used by inheritance lookups and tagging.
pub trait Member {
    fn name(&self) -> &str;
    /// Field type or method descriptor.
    fn descriptor(&self) -> &str;
    fn owner(&self) -> &str;
    fn modifiers(&self) -> &Modifiers;
    fn tags(&self) -> &Tags;
    fn tags_mut(&mut self) -> &mut Tags;
    fn declaring_class(&self) -> ClassId;
    fn signature(&self) -> String;

    fn is_missing(&self) -> bool {
        self.tags().is_missing()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: String,
    pub modifiers: Modifiers,
    pub value: Option<String>,
    /// FQCN of the class whose table holds this field.
    pub owner: String,
    pub enclosing_class: ClassId,
    pub declaring_class: ClassId,
    pub getters: Vec<MethodId>,
    pub setters: Vec<MethodId>,
    pub callers: Vec<MethodId>,
    pub tags: Tags,
    pub(crate) fingerprint: u64,
}

impl Field {
    pub(crate) fn from_def(def: FieldDef, owner: ClassId, fqcn: &str) -> Self {
        let fingerprint = fingerprint(&def);
        Self {
            name: def.name,
            field_type: def.field_type,
            modifiers: def.modifiers,
            value: def.value,
            owner: fqcn.to_string(),
            enclosing_class: owner,
            declaring_class: owner,
            getters: Vec::new(),
            setters: Vec::new(),
            callers: Vec::new(),
            tags: Tags::default(),
            fingerprint,
        }
    }

    /// Whether `def` would change this field.
    pub(crate) fn differs_from(&self, def: &FieldDef) -> bool {
        self.fingerprint != fingerprint(def)
    }

    pub(crate) fn refresh(&mut self, def: FieldDef) {
        self.fingerprint = fingerprint(&def);
        self.modifiers = def.modifiers;
        self.value = def.value;
    }

    pub fn add_getter(&mut self, method: MethodId) {
        self.getters.push(method);
    }

    pub fn add_setter(&mut self, method: MethodId) {
        self.setters.push(method);
    }
}

impl Member for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.field_type
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }

    fn signature(&self) -> String {
        field_signature(&self.owner, &self.name, &self.field_type)
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub descriptor: String,
    pub modifiers: Modifiers,
    pub blocks: Vec<InstructionBlock>,
    /// FQCN of the class whose table holds this method.
    pub owner: String,
    pub enclosing_class: ClassId,
    pub declaring_class: ClassId,
    pub callers: Vec<MethodId>,
    pub usage: MethodUsage,
    pub tags: Tags,
    pub(crate) fingerprint: u64,
    pub(crate) linked: bool,
}

impl Method {
    pub(crate) fn from_def(def: MethodDef, owner: ClassId, fqcn: &str) -> Self {
        let fingerprint = fingerprint(&def);
        Self {
            name: def.name,
            descriptor: def.descriptor,
            modifiers: def.modifiers,
            blocks: def.blocks,
            owner: fqcn.to_string(),
            enclosing_class: owner,
            declaring_class: owner,
            callers: Vec::new(),
            usage: MethodUsage::default(),
            tags: Tags::default(),
            fingerprint,
            linked: false,
        }
    }

    pub(crate) fn differs_from(&self, def: &MethodDef) -> bool {
        self.fingerprint != fingerprint(def)
    }

    /// Replaces the body. Facts produced by the previous body are retracted
    /// the next time the method is linked.
    pub(crate) fn refresh(&mut self, def: MethodDef) {
        self.fingerprint = fingerprint(&def);
        self.modifiers = def.modifiers;
        self.blocks = def.blocks;
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|block| block.instructions.iter())
    }
}

impl Member for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }

    fn signature(&self) -> String {
        method_signature(&self.owner, &self.name, &self.descriptor)
    }
}
