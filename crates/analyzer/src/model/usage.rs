use database::Collection;

use crate::model::instruction::InstructionRef;
use crate::model::{ClassId, FieldView};

/// Per-method usage tally: key to every observation, keys kept in first-use order.
#[derive(Debug, Clone)]
pub struct UsageMap<T> {
    entries: Collection<Vec<T>>,
}

impl<T> Default for UsageMap<T> {
    fn default() -> Self {
        Self {
            entries: Collection::new(),
        }
    }
}

impl<T> UsageMap<T> {
    /// Records `value` under `key`. Returns `true` on the first use of `key`.
    pub fn record(&mut self, key: &str, value: T) -> bool {
        if let Some(values) = self.entries.get_mut(key) {
            values.push(value);
            return false;
        }
        self.entries.insert(key, vec![value]);
        true
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys recorded.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a method touched a class. Call and field sites record the class the
/// member was viewed through; type sites record the instruction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassUse {
    Enclosing(ClassId),
    Site(InstructionRef),
}

#[derive(Debug, Clone, Default)]
pub struct MethodUsage {
    pub classes: UsageMap<ClassUse>,
    /// Callee signature -> registers of each call site.
    pub methods: UsageMap<Vec<String>>,
    pub fields: UsageMap<FieldView>,
}
