//! Authentication for the PesXChange backend
//!
//! Students log in with their SRN and PESU password. Credentials are checked
//! by the external PESU identity provider, the returned profile is upserted
//! into `user_profiles`, and a signed session token is issued.

pub mod error;
pub mod identity;
pub mod jwt;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod service;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use identity::{IdentityConfig, IdentityProvider, PesuAuthClient};
pub use jwt::{Claims, JwtConfig, JwtService, TokenType};
pub use rate_limiter::{Decision, RateLimiter, RateLimiterConfig};
pub use repositories::UserRepository;
pub use service::{AuthService, LoginSession, RefreshedToken};
