//! JWT service for session token generation and validation
//!
//! Tokens are signed with HS256 using a shared secret. Access tokens are
//! presented on every authenticated API call; refresh tokens are only accepted
//! by the refresh endpoint.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, warn};

use crate::error::{AuthError, AuthResult};
use crate::models::User;

/// Issuer stamped into and required from every token
pub const ISSUER: &str = "pesxchange-backend";

/// Shortest secret accepted for signing
pub const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Access token expiration time in seconds (default: 24 hours)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Build a configuration with the default lifetimes.
    ///
    /// Fails when the secret is shorter than [`MIN_SECRET_LEN`].
    pub fn from_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Configuration(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }

        Ok(JwtConfig {
            secret,
            access_token_expiry: 24 * 60 * 60,
            refresh_token_expiry: 7 * 24 * 60 * 60,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub srn: String,
    pub name: String,
    pub email: String,
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    fn now() -> AuthResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| AuthError::Configuration(format!("Failed to get current time: {}", e)))
    }

    fn issue(&self, user: &User, token_type: TokenType, lifetime: u64) -> AuthResult<String> {
        let now = Self::now()?;
        let claims = Claims {
            user_id: user.id.to_string(),
            srn: user.srn.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            iss: ISSUER.to_string(),
            sub: user.id.to_string(),
            iat: now,
            nbf: now,
            exp: now + lifetime,
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign {:?} token: {}", token_type, e);
            AuthError::Signing(e)
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> AuthResult<String> {
        self.issue(user, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> AuthResult<String> {
        self.issue(user, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token of the expected type and return its claims
    pub fn validate_token(&self, token: &str, expected: TokenType) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Rejected token: {}", e);
                match e.kind() {
                    ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                    _ => AuthError::InvalidToken,
                }
            })?
            .claims;

        if claims.user_id.is_empty() || claims.srn.is_empty() {
            return Err(AuthError::InvalidClaims);
        }

        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }

        Ok(claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}
