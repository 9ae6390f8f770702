use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// The write would leave the record in an invalid state.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn corrupt(column: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Corrupt(format!("{column}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
