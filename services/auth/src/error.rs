//! Errors raised by the authentication service

use common::error::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid SRN format")]
    InvalidSrnFormat,

    #[error("username and password are required")]
    MissingCredentials,

    #[error("input length exceeds maximum allowed")]
    InputTooLong,

    /// Transport failure or non-2xx answer from the identity provider
    #[error("authentication service unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("invalid authentication response: {0}")]
    InvalidProviderResponse(String),

    /// The provider rejected the credentials; carries its message
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("profile information not available")]
    ProfileMissing,

    #[error("user not found")]
    UserNotFound,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Invalid token claims")]
    InvalidClaims,

    #[error("Invalid token type")]
    WrongTokenType,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type AuthResult<T> = Result<T, AuthError>;
