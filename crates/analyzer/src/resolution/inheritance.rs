use rustc_hash::FxHashSet;
use tracing::warn;

use crate::model::{ClassId, Member, MemberView};
use crate::program::ProgramDatabase;
use crate::resolution::kind::{MemberKind, MemberReference};

/// Walks up the `extends` chain from `start` looking for a member visible to subclasses.
///
/// Private matches are skipped. A `missing` match ends the walk: nothing
/// real is assumed to be reachable above a placeholder. The returned view has
/// `enclosing == declaring == ` the class that holds the member; callers
/// rewrite `enclosing_class` to the requesting class.
pub fn find_inherited<K: MemberKind>(
    db: &ProgramDatabase,
    reference: &K::Ref,
    start: ClassId,
) -> Option<MemberView<K::Id>> {
    let mut visited = FxHashSet::default();
    let mut current = Some(start);

    while let Some(class_id) = current {
        if !visited.insert(class_id) {
            warn!(
                class = %db.class(class_id).fqcn,
                "Inheritance cycle while resolving {} {}",
                K::KIND,
                reference.signature()
            );
            return None;
        }
        if let Some(member) = scan_class::<K>(db, class_id, reference) {
            return Some(MemberView::direct(member, class_id));
        }
        current = db.superclass_of(class_id);
    }

    None
}

fn scan_class<K: MemberKind>(
    db: &ProgramDatabase,
    class_id: ClassId,
    reference: &K::Ref,
) -> Option<K::Id> {
    let mut candidates: Vec<K::Id> = K::own_table(db.class(class_id))
        .values()
        .copied()
        .filter(|&id| K::entity(db, id).name() == reference.name())
        .collect();
    // Stable: exact descriptor first, table order otherwise.
    candidates.sort_by_key(|&id| K::entity(db, id).descriptor() != reference.descriptor());

    candidates.into_iter().find(|&id| {
        let member = K::entity(db, id);
        member.is_missing() || member.modifiers().is_not_private()
    })
}
