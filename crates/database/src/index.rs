/// Append-only list of facts.
#[derive(Debug, Clone)]
pub struct Index<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T> Index<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Drops facts rejected by `keep`, returning how many were removed.
    /// Only meant for retracting facts whose producer is being rebuilt.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<'a, T> IntoIterator for &'a Index<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
