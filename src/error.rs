// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::IdentityError;
use crate::database::StoreError;
use crate::hooks::HookError;

/// Terminal failure of a single request, mapped to a status and a
/// `{"message": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),
    InvalidFilter(String),
    UnknownAction(String),

    // 401 Unauthorized
    Unauthenticated(String),

    // 403 Forbidden
    Forbidden,

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    StorageFailure(String),
    InternalServerError(String),

    // 502 Bad Gateway (custom logic runtime)
    HookUnavailable(String),
    InvalidHookResponse(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::InvalidJson(_)
            | ApiError::InvalidFilter(_)
            | ApiError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageFailure(_) | ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::HookUnavailable(_) | ApiError::InvalidHookResponse(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::InvalidFilter(msg) => msg,
            ApiError::UnknownAction(msg) => msg,
            ApiError::Unauthenticated(msg) => msg,
            ApiError::Forbidden => "unauthorized",
            ApiError::NotFound(msg) => msg,
            ApiError::StorageFailure(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::HookUnavailable(msg) => msg,
            ApiError::InvalidHookResponse(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "message": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn invalid_filter(field: &str) -> Self {
        ApiError::InvalidFilter(format!("field '{}' is not filterable", field))
    }

    pub fn unknown_action(action: &str) -> Self {
        ApiError::UnknownAction(format!("unknown action '{}'", action))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn not_found(id: &str) -> Self {
        ApiError::NotFound(format!("object {} not found", id))
    }

    pub fn invalid_hook_response(message: impl Into<String>) -> Self {
        ApiError::InvalidHookResponse(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::not_found(&id),
            StoreError::UnknownAction(action) => ApiError::unknown_action(&action),
            StoreError::InvalidFilter(field) => ApiError::invalid_filter(&field),
            other => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", other);
                ApiError::StorageFailure("database error occurred".to_string())
            }
        }
    }
}

impl From<HookError> for ApiError {
    fn from(err: HookError) -> Self {
        tracing::error!("Custom logic error: {}", err);
        match err {
            HookError::Unavailable { .. } | HookError::Status { .. } => {
                ApiError::HookUnavailable("request to custom logic endpoint failed".to_string())
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        tracing::debug!("Identity extraction failed: {}", err);
        ApiError::unauthenticated(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
