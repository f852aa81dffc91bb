use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcomes of store operations that are not success. Everything except
/// `Internal` is an expected result of concurrent or malformed use.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("gift is already reserved")]
    AlreadyReserved,

    #[error("gift is not reserved")]
    NotReserved,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Internal(err.into())
    }
}

/// Required text field must be non-blank.
pub(crate) fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}
