//! The only place synthetic entities come from. Each one is tagged `missing`,
//! reachable from its owner and recorded in the `missing` index.

use tracing::debug;

use crate::model::{
    Class, ClassId, FieldRef, FieldView, MemberView, MethodRef, MethodView, MissingEntity,
    Modifiers,
};
use crate::program::ProgramDatabase;

pub fn create_missing_class(db: &mut ProgramDatabase, fqcn: &str) -> ClassId {
    let mut class = Class::from_fqcn(fqcn);
    class.tags.set_missing(true);

    let id = db.class_arena.alloc(class);
    db.classes.insert(fqcn, id);
    db.missing.insert(MissingEntity::Class(id));
    db.attach_to_package(id);

    debug!(fqcn = %fqcn, "Created missing class");
    id
}

pub fn create_missing_field(
    db: &mut ProgramDatabase,
    reference: &FieldRef,
    owner: ClassId,
    modifiers: Modifiers,
) -> FieldView {
    let mut def = reference.to_field();
    def.modifiers = modifiers;

    let id = db.register_field(owner, def);
    db.field_mut(id).tags.set_missing(true);
    db.missing.insert(MissingEntity::Field(id));

    debug!(signature = %reference.signature(), "Created missing field");
    MemberView::direct(id, owner)
}

pub fn create_missing_method(
    db: &mut ProgramDatabase,
    reference: &MethodRef,
    owner: ClassId,
    modifiers: Modifiers,
) -> MethodView {
    let mut def = reference.to_method();
    def.modifiers = modifiers;

    let id = db.register_method(owner, def);
    db.method_mut(id).tags.set_missing(true);
    db.missing.insert(MissingEntity::Method(id));

    debug!(signature = %reference.signature(), "Created missing method");
    MemberView::direct(id, owner)
}
