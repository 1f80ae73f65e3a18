/// Errors from key resolution and value storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is empty or contains characters outside `[A-Za-z0-9._-]`.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The key canonicalizes to a path outside the store root.
    #[error("key {key:?} resolves outside the store root")]
    PathEscape { key: String },

    /// No regular file exists for the key.
    #[error("no value stored for key {key:?}")]
    NotFound { key: String },

    /// I/O error from the underlying filesystem or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for errors that mean "nothing addressable here":
    /// the value is absent or the key points outside the root.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PathEscape { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
