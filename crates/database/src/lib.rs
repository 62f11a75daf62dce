//! In-memory storage backing the program model.
//!
//! The store is made of three building blocks:
//! - [`Arena`]: owns every value of one kind behind an `index_vec` typed index.
//! - [`Collection`]: a keyed `IndexMap` (signature or FQCN to value) iterated in first-insertion order.
//! - [`Index`]: an append-only list of facts (edges, diagnostics, audit entries).
//!
//! Nothing here allocates on lookup and nothing here is fallible apart from
//! dereferencing an index that was never allocated by the arena.

pub mod arena;
pub mod collection;
pub mod index;
pub mod types;

pub use arena::Arena;
pub use collection::Collection;
pub use index::Index;
pub use types::{DatabaseError, DatabaseResult};
