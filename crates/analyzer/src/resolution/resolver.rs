use tracing::debug;

use crate::model::{
    ClassId, FieldRef, FieldView, Link, MemberView, MethodRef, MethodView, Modifiers, TypeLink,
};
use crate::program::ProgramDatabase;
use crate::resolution::inheritance::find_inherited;
use crate::resolution::kind::{FieldKind, MemberKind, MemberReference, MethodKind};
use crate::resolution::missing;

enum Lookup<H> {
    Found(MemberView<H>),
    /// Nothing visible; a placeholder belongs on this class.
    NotFound(ClassId),
}

/// Resolves references against the accumulated database. Every operation is
/// total: a miss yields a placeholder instead of an error.
pub struct Resolver<'a> {
    db: &'a mut ProgramDatabase,
}

impl<'a> Resolver<'a> {
    pub fn new(db: &'a mut ProgramDatabase) -> Self {
        Self { db }
    }

    pub fn resolve_type(&mut self, fqcn: &str) -> ClassId {
        match self.db.class_by_name(fqcn) {
            Some(id) => id,
            None => missing::create_missing_class(self.db, fqcn),
        }
    }

    /// A resolved link already names the canonical class; handles are only
    /// ever issued by this database.
    pub fn resolve_type_link(&mut self, link: &TypeLink) -> ClassId {
        match link {
            Link::Resolved(id) => *id,
            Link::Unresolved(reference) => self.resolve_type(&reference.name),
        }
    }

    pub fn resolve_field(&mut self, reference: &FieldRef) -> FieldView {
        match self.lookup::<FieldKind>(reference) {
            Lookup::Found(view) => view,
            Lookup::NotFound(owner) => {
                missing::create_missing_field(self.db, reference, owner, Modifiers::public())
            }
        }
    }

    /// `is_static_call` is kept on a synthesized method so static and instance
    /// call sites of unknown code stay distinguishable.
    pub fn resolve_method(&mut self, reference: &MethodRef, is_static_call: bool) -> MethodView {
        match self.lookup::<MethodKind>(reference) {
            Lookup::Found(view) => view,
            Lookup::NotFound(owner) => missing::create_missing_method(
                self.db,
                reference,
                owner,
                Modifiers::public().with_static(is_static_call),
            ),
        }
    }

    fn lookup<K: MemberKind>(&mut self, reference: &K::Ref) -> Lookup<K::Id> {
        let signature = reference.signature();
        if let Some(view) = K::index(self.db).get(&signature) {
            return Lookup::Found(*view);
        }

        let owner = self.resolve_type(reference.owner());
        let class = self.db.class(owner);

        if let Some(&member) = K::own_table(class).get(&signature) {
            let view = MemberView::direct(member, owner);
            K::index_mut(self.db).insert(signature, view);
            return Lookup::Found(view);
        }
        if let Some(&view) = K::inherited_table(class).get(&signature) {
            K::index_mut(self.db).insert(signature, view);
            return Lookup::Found(view);
        }

        let Some(parent) = self.db.superclass_of(owner) else {
            return Lookup::NotFound(owner);
        };
        let Some(found) = find_inherited::<K>(self.db, reference, parent) else {
            return Lookup::NotFound(owner);
        };

        let view = MemberView {
            member: found.member,
            enclosing_class: owner,
            declaring_class: found.declaring_class,
        };
        K::inherited_table_mut(self.db.class_mut(owner)).insert(signature.clone(), view);
        K::index_mut(self.db).insert(signature.clone(), view);

        debug!(
            signature = %signature,
            declared_in = %self.db.class(found.declaring_class).fqcn,
            "Resolved inherited {}",
            K::KIND
        );
        Lookup::Found(view)
    }
}
