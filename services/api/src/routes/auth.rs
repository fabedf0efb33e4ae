//! Login, token refresh and SRN lookup

use auth::models::User;
use auth::validation::is_valid_srn;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, AppJson},
    models::ApiResponse,
    state::AppState,
};

/// Body of `POST /api/auth/pesu`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/auth/refresh`
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckSrnQuery {
    pub srn: Option<String>,
}

#[derive(Serialize)]
struct LoginUser<'a> {
    id: Uuid,
    srn: &'a str,
    name: &'a str,
    email: &'a str,
    /// The full profile row
    profile: &'a User,
}

#[derive(Serialize)]
struct LoginResponse<'a> {
    user: LoginUser<'a>,
    token: &'a str,
    refresh_token: &'a str,
    expires_in: u64,
    refresh_expires_in: u64,
}

/// Authenticate against PESU and issue session tokens
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.auth.login(&payload.username, &payload.password).await?;

    let user = &session.user;
    let body = LoginResponse {
        user: LoginUser {
            id: user.id,
            srn: &user.srn,
            name: &user.name,
            email: &user.email,
            profile: user,
        },
        token: &session.token,
        refresh_token: &session.refresh_token,
        expires_in: session.expires_in,
        refresh_expires_in: session.refresh_expires_in,
    };

    Ok(Json(ApiResponse::ok(body).with_message("Login successful")).into_response())
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let refreshed = state.auth.refresh(&payload.refresh_token).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "token": refreshed.token,
        "expires_in": refreshed.expires_in,
    }))))
}

/// Whether a profile exists for an SRN
pub async fn check_srn(
    State(state): State<AppState>,
    Query(query): Query<CheckSrnQuery>,
) -> ApiResult<impl IntoResponse> {
    let srn = query
        .srn
        .map(|srn| srn.trim().to_string())
        .filter(|srn| !srn.is_empty())
        .ok_or_else(|| ApiError::Validation("SRN parameter is required".to_string()))?;

    if !is_valid_srn(&srn) {
        return Err(ApiError::Validation("Invalid SRN format".to_string()));
    }

    let exists = state.auth.check_srn_exists(&srn).await.map_err(|e| {
        error!("Failed to check SRN {}: {}", srn, e);
        ApiError::BadGateway("Failed to check SRN".to_string())
    })?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "exists": exists,
        "srn": srn,
    }))))
}
