use std::path::PathBuf;

use thiserror::Error;

/// The dataset could not be loaded. Fatal for the session: no partial
/// dataset is ever served.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{} has no columns", .0.display())]
    NoColumns(PathBuf),

    #[error("failed to read {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// An analysis request that cannot be answered. Recoverable: the caller keeps
/// its previous result and shows the message as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestError {
    #[error("select two different columns (both are '{0}')")]
    SameColumn(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("'{0}' is numeric and cannot be used as a grouping key")]
    NonCategoricalKey(String),
}
