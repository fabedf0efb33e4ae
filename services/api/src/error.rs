//! Custom error types for the API service

use auth::AuthError;
use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use common::error::DataError;
use media::MediaError;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or invalid input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to touch the resource
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Rate limit exhausted
    #[error("{message}")]
    TooManyRequests {
        message: String,
        retry_after: Duration,
    },

    /// An upstream service answered with an error or garbage
    #[error("{0}")]
    BadGateway(String),

    /// An upstream service is unreachable or asked us to retry
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a data service failure onto a generic, client-safe message.
    ///
    /// Details stay in the log; the client only learns whether retrying may
    /// help.
    pub fn data(err: DataError, message: &str) -> Self {
        match err {
            DataError::MissingEcho(table) => {
                warn!("Write to {} was not echoed back", table);
                ApiError::ServiceUnavailable(format!("{}, please retry", message))
            }
            DataError::Request(_) | DataError::Status { .. } => {
                ApiError::BadGateway(message.to_string())
            }
            DataError::Decode(_) | DataError::Configuration(_) => {
                ApiError::Internal(message.to_string())
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        let mut response = (status, body).into_response();
        if let ApiError::TooManyRequests { retry_after, .. } = &self {
            // Whole seconds, rounded up
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        error!("Data service error: {}", err);
        ApiError::data(err, "Data service request failed")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSrnFormat | AuthError::MissingCredentials | AuthError::InputTooLong => {
                ApiError::Validation(err.to_string())
            }
            AuthError::AuthenticationFailed(_)
            | AuthError::InvalidToken
            | AuthError::InvalidIssuer
            | AuthError::InvalidClaims
            | AuthError::WrongTokenType => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound => ApiError::Unauthorized("user no longer exists".to_string()),
            AuthError::ProviderUnavailable(cause) => {
                error!("Identity provider unavailable: {}", cause);
                ApiError::ServiceUnavailable("Authentication service unavailable".to_string())
            }
            AuthError::InvalidProviderResponse(_) | AuthError::ProfileMissing => {
                error!("Identity provider misbehaved: {}", err);
                ApiError::BadGateway("Invalid response from authentication service".to_string())
            }
            AuthError::Signing(_) | AuthError::Configuration(_) => {
                error!("Token issuance failed: {}", err);
                ApiError::Internal("Failed to generate authentication token".to_string())
            }
            AuthError::Data(e) => {
                error!("Failed to store user profile: {}", e);
                ApiError::data(e, "Failed to store user profile")
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Storage(_) | MediaError::Configuration(_) => {
                error!("Image storage error: {}", err);
                ApiError::Internal("Failed to store images".to_string())
            }
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::Validation("Invalid request body".to_string())
    }
}

/// `Json` extractor whose rejection renders as an [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
