use libris_http::error::AppError;
use serde_json::json;
use thiserror::Error;

/// Failures reported by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced author or book does not exist, or a filtered listing
    /// produced no rows.
    #[error("{0}")]
    NotFound(String),

    /// The ISBN is already used by another book.
    #[error("{0}")]
    Conflict(String),

    /// A field value violates a record constraint.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("storage error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Storage constraints are the last line of defence behind the
/// check-then-act validations; a violation that slips through is reported
/// with the same kind the early check would have used.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::conflict("a book with this isbn already exists");
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::not_found("referenced author does not exist");
            }
            if db_err.is_check_violation() {
                return StoreError::invalid_argument(format!(
                    "value rejected by storage constraint: {}",
                    db_err.message()
                ));
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => AppError::not_found(message),
            StoreError::Conflict(message) => {
                AppError::conflict(vec![json!({ "field": "isbn" })], message)
            }
            StoreError::InvalidArgument(message) => AppError::bad_request(message),
            StoreError::Database(err) => {
                AppError::Internal(anyhow::Error::new(err).context("storage failure"))
            }
        }
    }
}
