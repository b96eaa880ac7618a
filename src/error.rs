// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::{AuthError, Denial};
use crate::database::{MutationError, Resource, StoreError};
use crate::filter::FilterError;
use crate::services::render::RenderError;
use crate::validation::{FieldError, ValidationError};

/// HTTP API error. Every variant renders as `{"error": {code, message, details?}}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(Vec<FieldError>),
    InvalidJson(String),
    InvalidScope(String),
    RenderFailed(String),

    // 401 Unauthorized
    AuthRequired(String),
    InvalidToken(String),
    InvalidCredentials(String),

    // 403 Forbidden
    Forbidden(String),
    ReadOnly { kind: &'static str, message: String },

    // 404 Not Found
    NotFound { kind: Option<&'static str>, message: String },

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity (body parsed, content rejected)
    UnprocessableEntity(Vec<FieldError>),

    // 500 Internal Server Error; the detail is logged, never sent
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_)
            | ApiError::InvalidJson(_)
            | ApiError::InvalidScope(_)
            | ApiError::RenderFailed(_) => 400,
            ApiError::AuthRequired(_) | ApiError::InvalidToken(_) | ApiError::InvalidCredentials(_) => 401,
            ApiError::Forbidden(_) | ApiError::ReadOnly { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(_) | ApiError::UnprocessableEntity(_) => "Validation failed",
            ApiError::InvalidJson(msg)
            | ApiError::InvalidScope(msg)
            | ApiError::RenderFailed(msg)
            | ApiError::AuthRequired(msg)
            | ApiError::InvalidToken(msg)
            | ApiError::InvalidCredentials(msg)
            | ApiError::Forbidden(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::ReadOnly { message, .. } | ApiError::NotFound { message, .. } => message,
            ApiError::Internal(_) => "An unexpected error occurred",
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> String {
        match self {
            ApiError::ValidationError(_) | ApiError::UnprocessableEntity(_) => "VALIDATION_ERROR".into(),
            ApiError::InvalidJson(_) => "INVALID_JSON".into(),
            ApiError::InvalidScope(_) => "INVALID_SCOPE".into(),
            ApiError::RenderFailed(_) => "RENDER_FAILED".into(),
            ApiError::AuthRequired(_) => "AUTH_REQUIRED".into(),
            ApiError::InvalidToken(_) => "AUTH_ERROR".into(),
            ApiError::InvalidCredentials(_) => "INVALID_CREDENTIALS".into(),
            ApiError::Forbidden(_) => "FORBIDDEN".into(),
            ApiError::ReadOnly { kind, .. } => format!("READONLY_{}", kind.to_ascii_uppercase()),
            ApiError::NotFound { kind: Some(kind), .. } => format!("{}_NOT_FOUND", kind.to_ascii_uppercase()),
            ApiError::NotFound { kind: None, .. } => "NOT_FOUND".into(),
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED".into(),
            ApiError::Internal(_) => "INTERNAL_ERROR".into(),
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE".into(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut error = json!({
            "code": self.error_code(),
            "message": self.message(),
        });
        if let ApiError::ValidationError(details) | ApiError::UnprocessableEntity(details) = self {
            error["details"] = json!(details);
        }
        json!({ "error": error })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(details: Vec<FieldError>) -> Self {
        ApiError::ValidationError(details)
    }

    pub fn unprocessable_entity(details: Vec<FieldError>) -> Self {
        ApiError::UnprocessableEntity(details)
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn auth_required() -> Self {
        ApiError::AuthRequired("Authentication required".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound { kind: None, message: message.into() }
    }

    /// `<KIND>_NOT_FOUND` for a typed resource
    pub fn missing<R: Resource>() -> Self {
        ApiError::NotFound { kind: Some(R::KIND), message: format!("{} not found", display_name(R::KIND)) }
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("Method not allowed for this route".to_string())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Map a guarded update/delete outcome for resource `R`
    pub fn mutation<R: Resource>(err: MutationError) -> Self {
        match err {
            MutationError::NotFound => Self::missing::<R>(),
            MutationError::Denied(Denial::ReadOnly) => ApiError::ReadOnly {
                kind: R::KIND,
                message: format!("Shared {} records are read-only", display_name(R::KIND).to_lowercase()),
            },
            MutationError::Denied(Denial::NotOwner) => ApiError::Forbidden(format!(
                "You do not have permission to modify this {}",
                display_name(R::KIND).to_lowercase()
            )),
            MutationError::Store(e) => e.into(),
        }
    }
}

/// `brand_kit` → `Brand kit`
fn display_name(kind: &str) -> String {
    let spaced = kind.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Convert other error types to ApiError
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::ValidationError(err.details)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Sqlx(sqlx::Error::PoolTimedOut) | StoreError::Sqlx(sqlx::Error::PoolClosed) => {
                tracing::error!("Database pool unavailable: {}", err);
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            StoreError::Sqlx(sqlx::Error::Io(ref io)) => {
                tracing::error!("Database connection error: {}", io);
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        tracing::error!("Filter error: {}", err);
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials(err.to_string()),
            AuthError::Expired | AuthError::InvalidToken => ApiError::InvalidToken(err.to_string()),
            AuthError::MissingSecret | AuthError::TokenGeneration(_) => {
                tracing::error!("Token service error: {}", err);
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Storage(ref e) => {
                tracing::error!("Failed to store render: {}", e);
                ApiError::Internal(err.to_string())
            }
            other => {
                tracing::warn!("Render failed: {}", other);
                ApiError::RenderFailed(format!("Failed to render image: {}", other))
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Internal(detail) => write!(f, "internal error: {}", detail),
            _ => write!(f, "{}: {}", self.error_code(), self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
