use thiserror::Error;

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// No object stored under the key
    #[error("Object '{0}' not found")]
    NotFound(String),

    /// The key would escape the storage root or is empty
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
