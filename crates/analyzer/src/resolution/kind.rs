use database::Collection;
use index_vec::Idx;

use crate::model::{
    Class, Field, FieldId, FieldRef, Member, MemberView, Method, MethodId, MethodRef,
};
use crate::program::ProgramDatabase;

/// What a lookup needs to know about a field or method reference.
pub trait MemberReference {
    fn owner(&self) -> &str;
    fn name(&self) -> &str;
    fn descriptor(&self) -> &str;
    fn signature(&self) -> String;
}

impl MemberReference for FieldRef {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.field_type
    }

    fn signature(&self) -> String {
        FieldRef::signature(self)
    }
}

impl MemberReference for MethodRef {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn signature(&self) -> String {
        MethodRef::signature(self)
    }
}

/// Selects the tables a member lookup works on, so field and method
/// resolution share one implementation.
pub trait MemberKind {
    type Entity: Member;
    type Id: Idx;
    type Ref: MemberReference;

    const KIND: &'static str;

    fn entity(db: &ProgramDatabase, id: Self::Id) -> &Self::Entity;
    fn index(db: &ProgramDatabase) -> &Collection<MemberView<Self::Id>>;
    fn index_mut(db: &mut ProgramDatabase) -> &mut Collection<MemberView<Self::Id>>;
    fn own_table(class: &Class) -> &Collection<Self::Id>;
    fn inherited_table(class: &Class) -> &Collection<MemberView<Self::Id>>;
    fn inherited_table_mut(class: &mut Class) -> &mut Collection<MemberView<Self::Id>>;
}

pub struct FieldKind;

impl MemberKind for FieldKind {
    type Entity = Field;
    type Id = FieldId;
    type Ref = FieldRef;

    const KIND: &'static str = "field";

    fn entity(db: &ProgramDatabase, id: FieldId) -> &Field {
        db.field(id)
    }

    fn index(db: &ProgramDatabase) -> &Collection<MemberView<FieldId>> {
        &db.fields
    }

    fn index_mut(db: &mut ProgramDatabase) -> &mut Collection<MemberView<FieldId>> {
        &mut db.fields
    }

    fn own_table(class: &Class) -> &Collection<FieldId> {
        &class.fields
    }

    fn inherited_table(class: &Class) -> &Collection<MemberView<FieldId>> {
        &class.inherited_fields
    }

    fn inherited_table_mut(class: &mut Class) -> &mut Collection<MemberView<FieldId>> {
        &mut class.inherited_fields
    }
}

pub struct MethodKind;

impl MemberKind for MethodKind {
    type Entity = Method;
    type Id = MethodId;
    type Ref = MethodRef;

    const KIND: &'static str = "method";

    fn entity(db: &ProgramDatabase, id: MethodId) -> &Method {
        db.method(id)
    }

    fn index(db: &ProgramDatabase) -> &Collection<MemberView<MethodId>> {
        &db.methods
    }

    fn index_mut(db: &mut ProgramDatabase) -> &mut Collection<MemberView<MethodId>> {
        &mut db.methods
    }

    fn own_table(class: &Class) -> &Collection<MethodId> {
        &class.methods
    }

    fn inherited_table(class: &Class) -> &Collection<MemberView<MethodId>> {
        &class.inherited_methods
    }

    fn inherited_table_mut(class: &mut Class) -> &mut Collection<MemberView<MethodId>> {
        &mut class.inherited_methods
    }
}
