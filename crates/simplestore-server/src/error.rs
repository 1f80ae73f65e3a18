use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("no value configured for required parameter: {param}")]
    StartupConfigMissing { param: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] simplestore_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
