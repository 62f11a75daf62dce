//! Error types for the analyzer crate

use std::path::PathBuf;

use database::DatabaseError;
use thiserror::Error;

use crate::model::MethodId;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures at the API boundary. Resolution and merging never fail; they log
/// anomalies and carry on.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Method {method:?} is not part of the program database")]
    UnknownMethod {
        method: MethodId,
        #[source]
        source: DatabaseError,
    },

    #[error("Analysis source not found: {path:?}")]
    SourceNotFound { path: PathBuf },
}
