//! HTTP error responses.

use crate::domain::error::DomainError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Domain(DomainError),
}

/// JSON body returned on error.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing API key".to_string(),
            ),
            ApiError::Domain(e) => (status_for_error(&e), e.to_string()),
        };

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}

fn status_for_error(e: &DomainError) -> StatusCode {
    match e {
        DomainError::InvalidInput(_) | DomainError::Parse(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::DegenerateInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Embedding(_) => StatusCode::BAD_GATEWAY,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}
