//! Direct messages between users

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, AppJson},
    middleware::AuthUser,
    models::{ApiResponse, ConversationQuery, MarkReadRequest, PaginatedResponse, Pagination, SendMessageRequest},
    state::AppState,
    validation::{DEFAULT_PAGE_LIMIT, PageRequest, validate_message},
};

fn parse_query_id(raw: Option<&str>, name: &str) -> ApiResult<Option<Uuid>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("{} must be a valid ID", name))),
    }
}

/// Send a message to another user
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let receiver = validate_message(&payload).map_err(|e| {
        ApiError::Validation(format!("Validation failed: {}", e))
    })?;

    if receiver == auth_user.id {
        return Err(ApiError::Validation(
            "Cannot send message to yourself".to_string(),
        ));
    }

    let exists = state
        .users
        .find_by_id(receiver)
        .await
        .map_err(|e| {
            error!("Failed to look up receiver {}: {}", receiver, e);
            ApiError::data(e, "Failed to send message")
        })?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("receiver not found".to_string()));
    }

    let message = state
        .messages
        .send(auth_user.id, receiver, &payload.message, payload.item_id)
        .await
        .map_err(|e| {
            error!("Failed to send message from {}: {}", auth_user.id, e);
            ApiError::data(e, "Failed to send message")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(message).with_message("Message sent successfully")),
    ))
}

/// Conversation with another user, oldest first.
///
/// Unread messages from the other user are marked read in the background
/// once the page has been fetched.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ConversationQuery>,
) -> ApiResult<impl IntoResponse> {
    let other = parse_query_id(query.other_user_id.as_deref(), "other_user_id")?
        .ok_or_else(|| ApiError::Validation("other_user_id is required".to_string()))?;
    let item_id = parse_query_id(query.item_id.as_deref(), "item_id")?;
    let request = PageRequest::parse(query.limit.as_deref(), query.offset.as_deref(), DEFAULT_PAGE_LIMIT);

    let conversation = state
        .messages
        .conversation(auth_user.id, other, item_id, request)
        .await
        .map_err(|e| {
            error!("Failed to get messages for {}: {}", auth_user.id, e);
            ApiError::data(e, "Failed to get messages")
        })?;

    let messages = state.messages.clone();
    let me = auth_user.id;
    tokio::spawn(async move {
        if let Err(e) = messages.mark_read(me, other, item_id).await {
            warn!("Failed to mark messages from {} as read: {}", other, e);
        }
    });

    Ok(Json(PaginatedResponse::new(
        conversation.messages,
        Pagination {
            limit: request.limit,
            offset: request.offset,
            total: conversation.total,
        },
    )))
}

/// Mark messages from another user as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(payload): AppJson<MarkReadRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .messages
        .mark_read(auth_user.id, payload.other_user_id, payload.item_id)
        .await
        .map_err(|e| {
            error!("Failed to mark messages as read for {}: {}", auth_user.id, e);
            ApiError::data(e, "Failed to mark messages as read")
        })?;

    Ok(Json(ApiResponse::message("Messages marked as read")))
}

/// One entry per conversation partner, most recent first
pub async fn active_chats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let chats = state
        .messages
        .active_chats(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to get active chats for {}: {}", auth_user.id, e);
            ApiError::data(e, "Failed to get active chats")
        })?;

    Ok(Json(ApiResponse::ok(chats)))
}
