//! HTTP error type shared by every handler.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::warn;
use uuid::Uuid;

use crate::models::{ApiResponse, SelectField};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Unknown option '{value}' for field {field:?}")]
    InvalidOption { field: SelectField, value: String },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("Too many open sessions, try again later")]
    SessionLimit,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidOption { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionLimit => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        warn!("{} ({})", self, status.as_u16());
        HttpResponse::build(status).json(ApiResponse::<()>::error(&self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(
            ApiError::SessionNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidOption {
                field: SelectField::City,
                value: "paris".to_string(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadRequest("bad json".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SessionLimit.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn message_names_the_option() {
        let err = ApiError::InvalidOption {
            field: SelectField::Country,
            value: "mars".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown option 'mars' for field Country");
    }
}
