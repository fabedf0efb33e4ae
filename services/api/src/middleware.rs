//! Authentication and rate limiting middleware

use std::net::{IpAddr, SocketAddr};

use auth::Decision;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub srn: String,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !req.headers().contains_key(AUTHORIZATION) {
        return Err(ApiError::Unauthorized(
            "Authorization header required".to_string(),
        ));
    }

    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header format".to_string()))?;

    let claims = state.auth.verify_access_token(bearer.token()).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    let id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| ApiError::Unauthorized("Invalid token claims".to_string()))?;

    req.extensions_mut().insert(AuthUser {
        id,
        srn: claims.srn,
    });

    Ok(next.run(req).await)
}

/// General rate limit applied to every `/api` route
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&req);
    if let Decision::Limited { retry_after } = state.general_limiter.check(&key).await {
        return Err(ApiError::TooManyRequests {
            message: "Rate limit exceeded. Please try again later.".to_string(),
            retry_after,
        });
    }
    Ok(next.run(req).await)
}

/// Stricter rate limit for the authentication routes
pub async fn auth_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = format!("{}-auth", client_key(&req));
    if let Decision::Limited { retry_after } = state.auth_limiter.check(&key).await {
        return Err(ApiError::TooManyRequests {
            message: "Too many authentication attempts. Please wait 15 minutes before trying again."
                .to_string(),
            retry_after,
        });
    }
    Ok(next.run(req).await)
}

/// Client address used as rate limit key: first `X-Forwarded-For` entry,
/// then `X-Real-IP`, then the peer address
pub fn client_key<B>(req: &axum::http::Request<B>) -> String {
    let header_ip = |name: &str, first_only: bool| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                let value = if first_only {
                    value.split(',').next()?
                } else {
                    value
                };
                value.trim().parse::<IpAddr>().ok()
            })
    };

    header_ip("x-forwarded-for", true)
        .or_else(|| header_ip("x-real-ip", false))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
