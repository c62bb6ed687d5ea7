use thiserror::Error;

/// Errors raised by the document store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("malformed object id '{0}'")]
    MalformedId(String),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("corrupt data file: {0}")]
    Corrupt(String),

    #[error("document store is closed")]
    Closed,
}

pub type DbResult<T> = Result<T, DbError>;
