use index_vec::{Idx, IndexVec};

use crate::types::{DatabaseError, DatabaseResult};

/// Owner of every value of one entity kind, addressed by the typed index `I`.
/// Values are never removed, so an index stays valid for the lifetime of the arena.
#[derive(Debug, Clone)]
pub struct Arena<I: Idx, T> {
    kind: &'static str,
    items: IndexVec<I, T>,
}

impl<I: Idx, T> Arena<I, T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: IndexVec::new(),
        }
    }

    pub fn alloc(&mut self, value: T) -> I {
        self.items.push(value)
    }

    /// Panics on an index from another arena. Use [`Arena::try_get`] at API boundaries.
    pub fn get(&self, id: I) -> &T {
        &self.items[id]
    }

    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id]
    }

    pub fn try_get(&self, id: I) -> DatabaseResult<&T> {
        self.items.get(id).ok_or(DatabaseError::StaleIndex {
            kind: self.kind,
            index: id.index(),
            len: self.items.len(),
        })
    }

    pub fn contains(&self, id: I) -> bool {
        id.index() < self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items.iter_enumerated()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.items.iter_mut_enumerated()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    index_vec::define_index_type! {
        struct NameId = u32;
    }

    #[test]
    fn test_indices_are_stable_and_typed() {
        let mut arena: Arena<NameId, String> = Arena::new("names");
        let first = arena.alloc("a".to_string());
        let second = arena.alloc("b".to_string());

        assert_ne!(first, second);
        assert_eq!(arena.get(first), "a");
        arena.get_mut(second).push('!');
        assert_eq!(arena.get(second), "b!");
        assert_eq!(arena.len(), 2);
        assert_eq!(
            arena.iter().map(|(id, _)| id.index()).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_try_get_reports_stale_index() {
        let arena: Arena<NameId, u8> = Arena::new("bytes");
        let err = arena.try_get(NameId::from_usize(3)).unwrap_err();

        assert_eq!(
            err,
            DatabaseError::StaleIndex {
                kind: "bytes",
                index: 3,
                len: 0
            }
        );
        assert!(err.to_string().contains("bytes"));
        assert!(!arena.contains(NameId::from_usize(0)));
    }

    #[test]
    fn test_index_serializes_as_integer() {
        let id = NameId::from_usize(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");

        let back: NameId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
