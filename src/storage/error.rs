use std::path::PathBuf;

use thiserror::Error;

use crate::domain::track::{TrackId, TrackValidationError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    #[error("invalid track: {0}")]
    Validation(#[from] TrackValidationError),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
