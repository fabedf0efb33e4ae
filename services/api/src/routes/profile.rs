//! Public profiles and profile editing

use auth::models::ProfileUpdate;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, AppJson},
    middleware::AuthUser,
    models::ApiResponse,
    state::AppState,
};

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Get a user profile by ID
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id).map_err(|_| user_not_found())?;

    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to get user {}: {}", id, e);
            ApiError::data(e, "Failed to retrieve user profile")
        })?
        .ok_or_else(user_not_found)?;

    let etag = format!("\"{}-{}\"", user.id, user.updated_at.timestamp());
    Ok((
        [
            (header::CACHE_CONTROL, "public, max-age=300".to_string()),
            (header::ETAG, etag),
        ],
        Json(ApiResponse::ok(user)),
    ))
}

/// Update the caller's own profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> ApiResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id).map_err(|_| user_not_found())?;
    if id != auth_user.id {
        return Err(ApiError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }

    let update = ProfileUpdate::from_json(body).map_err(ApiError::Validation)?;
    if update.is_empty() {
        return Err(ApiError::Validation("No valid fields to update".to_string()));
    }

    let user = state
        .users
        .update_profile(id, update)
        .await
        .map_err(|e| {
            error!("Failed to update user {}: {}", id, e);
            ApiError::data(e, "Failed to update user profile")
        })?
        .ok_or_else(user_not_found)?;

    info!("Profile {} updated", user.srn);
    Ok(Json(
        ApiResponse::ok(user).with_message("Profile updated successfully"),
    ))
}
