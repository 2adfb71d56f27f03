use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("recall item {0} not found")]
    NotFound(Uuid),
    #[error("recall item already exists")]
    AlreadyExists,
    /// The persisted item changed since the caller read it.
    #[error("recall item {0} was modified concurrently")]
    ConcurrentModification(Uuid),
    #[error("stored recall item is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map unique-key violations to [`StoreError::AlreadyExists`].
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::AlreadyExists,
            _ => Self::Database(err),
        }
    }
}
