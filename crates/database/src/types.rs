use thiserror::Error;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Index {index} does not belong to the {kind} arena (size {len})")]
    StaleIndex {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}
