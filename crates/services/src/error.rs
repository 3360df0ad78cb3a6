//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `QuizService`.
///
/// Out-of-state calls (answering twice, advancing before answering) are not
/// errors; they are ignored and reported through the return value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question provider unavailable: {0}")]
    ProviderUnavailable(#[source] StorageError),
    #[error("quiz start was superseded by a newer request")]
    Superseded,
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while configuring the remote question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteBankError {
    #[error("invalid question bank url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("question bank url cannot be a base: {0}")]
    NotABase(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
