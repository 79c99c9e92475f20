//! HTTP error handling and conversion.
//!
//! This module provides error types for the REST API and implements
//! conversion from domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use civic_issues_domain::errors::{AuthorizationError, ValidationError};
use civic_issues_domain::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Message shown in place of backend error detail
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain or application error
    #[error(transparent)]
    Domain(#[from] AppError),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Invalid JWT token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Payload too large
    #[error("Payload too large")]
    PayloadTooLarge,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Domain(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Unauthorized | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.error_code(),
            Self::Unauthorized => "AUTHENTICATION_REQUIRED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Domain(err) if err.is_internal())
    }
}

/// Standardized error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    /// Add request ID to the error response
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error body attached to the response so middleware can finish it
#[derive(Debug, Clone)]
pub struct RenderedError {
    /// Body as rendered for clients
    pub body: ErrorResponse,
    /// Backend message withheld from `body`
    pub internal_detail: Option<String>,
}

fn details(err: &ApiError) -> Option<serde_json::Value> {
    match err {
        ApiError::Domain(AppError::Validation(ValidationError::Multiple(problems))) => {
            Some(serde_json::json!({ "problems": problems }))
        }
        ApiError::Domain(AppError::Validation(ValidationError::FieldValidation { field, .. })) => {
            Some(serde_json::json!({ "field": field }))
        }
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        let rendered = if self.is_internal() {
            error!(error_code, message = %message, "Request failed with internal error");
            RenderedError {
                body: ErrorResponse::new(error_code, INTERNAL_ERROR_MESSAGE),
                internal_detail: Some(message),
            }
        } else {
            if status.is_server_error() {
                error!(error_code, message = %message, "Request failed");
            } else {
                debug!(error_code, message = %message, "Request rejected");
            }
            let mut body = ErrorResponse::new(error_code, message);
            body.details = details(&self);
            RenderedError {
                body,
                internal_detail: None,
            }
        };

        let mut response = (status, Json(rendered.body.clone())).into_response();
        response.extensions_mut().insert(rendered);
        response
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        Self::Domain(AppError::Authorization(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(AppError::Validation(err))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
