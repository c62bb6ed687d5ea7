use quire_db::{DbError, ObjectId};
use quire_http::error::AppError;
use thiserror::Error;

use super::validation::FieldError;

pub const NOT_FOUND_MESSAGE: &str = "Book Not Found.";
pub const NOT_OWNER_MESSAGE: &str = "User Not Authorized.";
pub const UNAUTHENTICATED_MESSAGE: &str = "No token, authorization denied";

/// Failures of the book operations.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("authentication required")]
    Unauthenticated,

    #[error("caller {caller} does not own book {book}")]
    Forbidden { book: ObjectId, caller: ObjectId },

    #[error("book {0} not found")]
    NotFound(ObjectId),

    #[error("malformed book identifier '{0}'")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for BookError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::MalformedId(id) => Self::InvalidIdentifier(id),
            other => Self::Internal(anyhow::Error::new(other).context("document store failure")),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(errors) => {
                let details = errors
                    .iter()
                    .map(|error| serde_json::json!({ "field": error.field, "message": error.message }))
                    .collect();
                AppError::validation(details, "Validation failed")
            }
            BookError::Unauthenticated => AppError::unauthorized(UNAUTHENTICATED_MESSAGE),
            // Not-owner is reported as 401, not 403.
            BookError::Forbidden { .. } => {
                AppError::unauthorized_with_code(NOT_OWNER_MESSAGE, "forbidden")
            }
            BookError::NotFound(_) | BookError::InvalidIdentifier(_) => {
                AppError::not_found(NOT_FOUND_MESSAGE)
            }
            BookError::Internal(err) => AppError::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn store_errors_map_to_book_errors() {
        let err = BookError::from(DbError::MalformedId("abc".to_string()));
        assert!(matches!(err, BookError::InvalidIdentifier(id) if id == "abc"));

        let err = BookError::from(DbError::Closed);
        assert!(matches!(err, BookError::Internal(_)));
    }

    #[test]
    fn status_codes_follow_the_http_contract() {
        let id = ObjectId::new();
        let cases = [
            (
                BookError::Validation(vec![FieldError::new("title", "Title is required")]),
                StatusCode::BAD_REQUEST,
            ),
            (BookError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                BookError::Forbidden {
                    book: id,
                    caller: ObjectId::new(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (BookError::NotFound(id), StatusCode::NOT_FOUND),
            (
                BookError::InvalidIdentifier("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                BookError::Internal(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }
}
