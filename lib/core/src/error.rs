use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset not found at {path}: {reason}")]
    DatasetNotFound { path: PathBuf, reason: String },

    #[error("No item found matching '{0}'")]
    ItemNotFound(String),

    #[error("No items found with tag(s) {0}")]
    NoMatch(String),

    #[error("No tags provided")]
    NoTags,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Query-time failures the caller can surface as "not found" and re-query.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ItemNotFound(_) | Error::NoMatch(_) | Error::DatasetNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
