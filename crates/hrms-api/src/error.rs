//! HTTP mapping of [`HrmsError`].
//!
//! | kind       | status | code                                |
//! |------------|--------|-------------------------------------|
//! | Validation | 400    | `INVALID_IDENTIFIER` / `INVALID_INPUT` |
//! | NotFound   | 404    | `TABLE_NOT_FOUND` / `NOT_FOUND`     |
//! | Connection | 500    | `STORE_UNAVAILABLE`                 |
//! | Scan       | 500    | `SCAN_FAILED`                       |
//! | Internal   | 500    | `INTERNAL_ERROR`                    |
//! | Cancelled  | 503    | `QUERY_CANCELLED`                   |
//!
//! 4xx bodies carry the error text; 5xx bodies carry a generic message and
//! the detail only goes to the log.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use hrms_commons::{ErrorKind, HrmsError};
use std::fmt;

use crate::models::ErrorResponse;

#[derive(Debug)]
pub struct ApiError {
    inner: HrmsError,
}

impl ApiError {
    pub fn inner(&self) -> &HrmsError {
        &self.inner
    }

    pub fn error_code(&self) -> &'static str {
        match &self.inner {
            HrmsError::Validation { .. } => "INVALID_IDENTIFIER",
            HrmsError::InvalidInput(_) => "INVALID_INPUT",
            HrmsError::TableNotFound(_) => "TABLE_NOT_FOUND",
            HrmsError::NotFound(_) => "NOT_FOUND",
            HrmsError::Connection(_) => "STORE_UNAVAILABLE",
            HrmsError::Scan { .. } => "SCAN_FAILED",
            HrmsError::Cancelled(_) => "QUERY_CANCELLED",
            HrmsError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self.inner.kind() {
            ErrorKind::Validation | ErrorKind::NotFound => self.inner.to_string(),
            ErrorKind::Connection => "The data store is unavailable".to_string(),
            ErrorKind::Scan => "A stored value could not be decoded".to_string(),
            ErrorKind::Cancelled => "The query was cancelled or timed out".to_string(),
            ErrorKind::Internal => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<HrmsError> for ApiError {
    fn from(inner: HrmsError) -> Self {
        Self { inner }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.inner.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Connection | ErrorKind::Scan | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("[API] {} {}: {}", status.as_u16(), self.error_code(), self.inner);
        } else {
            log::debug!("[API] {} {}: {}", status.as_u16(), self.error_code(), self.inner);
        }

        HttpResponse::build(status).json(ErrorResponse::new(self.error_code(), self.public_message()))
    }
}
