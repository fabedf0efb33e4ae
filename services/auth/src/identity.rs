//! Client for the external PESU identity provider
//!
//! The provider validates a student's SRN and password and returns the
//! student's academic profile. Calls are never retried here; a failed call is
//! reported to the caller as a retryable error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::models::{PesuAuthResponse, PesuProfile, pesu::PesuAuthRequest};

/// Identity provider configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Base URL; requests go to `{base_url}/authenticate`
    pub base_url: String,
    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,
    /// User agent announced to the provider
    pub user_agent: String,
}

impl IdentityConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 15,
            user_agent: "PesXChange-Backend/1.0".to_string(),
        }
    }
}

/// Something that can check a username/password pair
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and return the provider's profile for the user
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PesuProfile>;
}

/// HTTP client for the PESU auth API
#[derive(Clone)]
pub struct PesuAuthClient {
    client: Client,
    authenticate_url: String,
}

impl PesuAuthClient {
    pub fn new(config: &IdentityConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            authenticate_url: format!("{}/authenticate", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IdentityProvider for PesuAuthClient {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PesuProfile> {
        let request = PesuAuthRequest {
            username: username.to_uppercase(),
            password,
            profile: true,
        };

        let response = self
            .client
            .post(&self.authenticate_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach identity provider: {}", e);
                AuthError::ProviderUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Identity provider returned status {}", status);
            return Err(AuthError::ProviderUnavailable(format!("status: {}", status.as_u16())));
        }

        let body: PesuAuthResponse = response.json().await.map_err(|e| {
            error!("Failed to decode identity provider response: {}", e);
            AuthError::InvalidProviderResponse(e.to_string())
        })?;

        interpret(body)
    }
}

/// Turn a decoded provider answer into a profile or an error
pub(crate) fn interpret(body: PesuAuthResponse) -> AuthResult<PesuProfile> {
    if !body.status {
        warn!("Identity provider rejected credentials: {}", body.message);
        return Err(AuthError::AuthenticationFailed(body.message));
    }

    let profile = body.profile.ok_or(AuthError::ProfileMissing)?;
    info!("Identity provider authenticated {}", profile.srn);
    Ok(profile)
}
