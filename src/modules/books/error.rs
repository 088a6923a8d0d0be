use serde_json::json;
use shelf_http::AppError;
use shelf_store::StoreError;
use thiserror::Error;

use super::validation::FieldError;

/// Failures of a books operation
#[derive(Error, Debug)]
pub enum BookError {
    #[error("invalid book payload")]
    Validation(Vec<FieldError>),

    #[error("Book with id {0} not found!")]
    NotFound(String),

    #[error("{0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::Validation(errors) => AppError::validation(
                errors
                    .into_iter()
                    .map(|e| json!({"field": e.field, "message": e.message}))
                    .collect(),
                message,
            ),
            BookError::NotFound(_) => AppError::not_found(message),
            BookError::InvalidPayload(_) => AppError::bad_request(message),
            BookError::Store(source) => AppError::internal(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn not_found_names_the_id() {
        let err = AppError::from(BookError::NotFound("abc123".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn storage_failures_are_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::from(BookError::Store(StoreError::Io {
            path: "books.json".into(),
            source: io,
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
