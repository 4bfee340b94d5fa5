use sea_orm::SqlErr;
use thiserror::Error;

use crate::store::path::ResourcePath;

/// Failure taxonomy shared by the store, the remote client and the list
/// state machines.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote catalog was unreachable or answered with an error status.
    #[error("network request failed: {0}")]
    Network(String),

    /// A unique or foreign-key constraint rejected a local write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A batch step failed and the whole batch rolled back.
    #[error("batch step {step} failed: {source}")]
    BatchApply {
        step: usize,
        #[source]
        source: Box<Error>,
    },

    /// A read expected at least one row and found none.
    #[error("no rows at {0}")]
    NotFound(ResourcePath),

    /// A back-reference named a step that produced no row id.
    #[error("step {step} does not provide a row id to back-reference")]
    BadBackRef { step: usize },

    /// The requested write does not fit the shape of this path.
    #[error("unsupported operation at {path}: {detail}")]
    PathMismatch {
        path: ResourcePath,
        detail: &'static str,
    },

    #[error("database error: {0}")]
    Db(#[source] sea_orm::DbErr),
}

/// Stable classification for surfacing failures to a view layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Network,
    Constraint,
    BatchApply,
    NotFound,
    Store,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Constraint(_) => ErrorKind::Constraint,
            Error::BatchApply { .. } => ErrorKind::BatchApply,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::BadBackRef { .. } | Error::PathMismatch { .. } | Error::Db(_) => {
                ErrorKind::Store
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Error::Constraint(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Error::Constraint(msg),
            _ => Error::Db(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
