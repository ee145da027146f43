//! Crate-wide error type.
//!
//! Every fallible operation in the storage and query layers returns
//! [`Result<T>`]. Variants group into SQL errors (lexical/syntactic/
//! semantic), storage errors (malformed file contents), and invariant
//! violations (internal inconsistency, always fatal).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AntdbError>;

#[derive(Error, Debug)]
pub enum AntdbError {
    #[error("sql error: {0}")]
    Sql(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AntdbError {
    pub fn sql(msg: impl Into<String>) -> Self {
        Self::Sql(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
