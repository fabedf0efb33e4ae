//! Login, refresh and SRN lookup built on the identity provider, the user
//! repository and the JWT service

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::identity::IdentityProvider;
use crate::jwt::{Claims, JwtService, TokenType};
use crate::models::User;
use crate::repositories::UserRepository;
use crate::validation::{validate_credentials, validate_srn};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: u64,
}

/// Fresh access token issued from a refresh token
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: UserRepository,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: UserRepository, jwt: JwtService) -> Self {
        Self {
            identity,
            users,
            jwt,
        }
    }

    /// Check credentials with the identity provider and upsert the profile.
    ///
    /// Malformed input is rejected before any network call.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User> {
        let (username, password) = validate_credentials(username, password)?;

        let profile = self.identity.authenticate(username, password).await?;
        let user = self.users.upsert_from_profile(&profile).await?;

        info!("User {} authenticated", user.srn);
        Ok(user)
    }

    /// Authenticate and issue an access/refresh token pair
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<LoginSession> {
        let user = self.authenticate(username, password).await?;
        let token = self.jwt.generate_access_token(&user)?;
        let refresh_token = self.jwt.generate_refresh_token(&user)?;

        Ok(LoginSession {
            user,
            token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry(),
            refresh_expires_in: self.jwt.refresh_token_expiry(),
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedToken> {
        let claims = self.jwt.validate_token(refresh_token, TokenType::Refresh)?;
        let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| AuthError::InvalidClaims)?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!("Refresh token presented for unknown user {}", user_id);
            AuthError::UserNotFound
        })?;

        Ok(RefreshedToken {
            token: self.jwt.generate_access_token(&user)?,
            expires_in: self.jwt.access_token_expiry(),
        })
    }

    /// Validate a bearer token presented on an API call
    pub fn verify_access_token(&self, token: &str) -> AuthResult<Claims> {
        self.jwt.validate_token(token, TokenType::Access)
    }

    /// Whether a profile exists for a well-formed SRN
    pub async fn check_srn_exists(&self, srn: &str) -> AuthResult<bool> {
        validate_srn(srn)?;
        Ok(self.users.srn_exists(srn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtConfig;
    use crate::models::PesuProfile;
    use async_trait::async_trait;
    use common::database::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Identity provider that accepts one password and counts calls
    struct StubProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PesuProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if password != "correct horse" {
                return Err(AuthError::AuthenticationFailed(
                    "Invalid username or password".to_string(),
                ));
            }
            Ok(PesuProfile {
                name: "Asha Rao".to_string(),
                srn: username.to_uppercase(),
                email: "asha@example.com".to_string(),
                ..Default::default()
            })
        }
    }

    fn service() -> (AuthService, Arc<StubProvider>) {
        let provider = Arc::new(StubProvider {
            calls: AtomicUsize::new(0),
        });
        let users = UserRepository::new(Arc::new(MemoryStore::new()));
        let jwt = JwtService::new(
            JwtConfig::from_secret("0123456789abcdef0123456789abcdef").unwrap(),
        );
        (AuthService::new(provider.clone(), users, jwt), provider)
    }

    #[tokio::test]
    async fn malformed_srn_never_reaches_provider() {
        let (service, provider) = service();
        for username in ["", "PES1UG21", "ABC1UG21CS001", "PES1UG21CS001; DROP"] {
            let err = service.login(username, "correct horse").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidSrnFormat));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn login_issues_usable_tokens() {
        let (service, _) = service();
        let session = service.login("pes1ug21cs001", "correct horse").await.unwrap();

        assert_eq!(session.user.srn, "PES1UG21CS001");
        assert_eq!(session.expires_in, 24 * 60 * 60);
        assert_eq!(session.refresh_expires_in, 7 * 24 * 60 * 60);
        let claims = service.verify_access_token(&session.token).unwrap();
        assert_eq!(claims.user_id, session.user.id.to_string());
        assert!(service.verify_access_token(&session.refresh_token).is_err());

        let refreshed = service.refresh(&session.refresh_token).await.unwrap();
        assert!(service.verify_access_token(&refreshed.token).is_ok());
    }

    #[tokio::test]
    async fn provider_rejection_is_surfaced() {
        let (service, provider) = service();
        let err = service.login("PES1UG21CS001", "wrong").await.unwrap_err();

        assert!(matches!(err, AuthError::AuthenticationFailed(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn srn_check_validates_format_first() {
        let (service, _) = service();
        assert!(matches!(
            service.check_srn_exists("nope").await,
            Err(AuthError::InvalidSrnFormat)
        ));
        assert!(!service.check_srn_exists("PES1UG21CS001").await.unwrap());

        service.login("PES1UG21CS001", "correct horse").await.unwrap();
        assert!(service.check_srn_exists("PES1UG21CS001").await.unwrap());
    }
}
