//! Item listing, detail and owner-only mutations

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, AppJson},
    middleware::AuthUser,
    models::{ApiResponse, CreateItemRequest, ItemPatch, ItemQuery, ItemView, PaginatedResponse, Pagination},
    repositories::{ItemPage, Mutation},
    state::AppState,
    validation::{DEFAULT_PAGE_LIMIT, PageRequest, SELLER_PAGE_LIMIT, validate_item_patch, validate_new_item},
};

pub(crate) fn item_not_found() -> ApiError {
    ApiError::NotFound("Item not found".to_string())
}

/// Parse an item ID from the path; malformed IDs name no item
pub(crate) fn parse_item_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| item_not_found())
}

fn listing(page: ItemPage, request: PageRequest) -> PaginatedResponse<ItemView> {
    PaginatedResponse::new(
        page.items.into_iter().map(ItemView::listing).collect(),
        Pagination {
            limit: request.limit,
            offset: request.offset,
            total: page.total,
        },
    )
}

/// List items with filters, sorting and pagination
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<impl IntoResponse> {
    let request = PageRequest::parse(query.limit.as_deref(), query.offset.as_deref(), DEFAULT_PAGE_LIMIT);
    let filters = query.filters();

    let page = state.items.list(&filters, request).await.map_err(|e| {
        error!("Failed to list items: {}", e);
        ApiError::data(e, "Failed to retrieve items")
    })?;

    Ok((
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Json(listing(page, request)),
    ))
}

/// Get a single item
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_item_id(&id)?;
    let item = state
        .items
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to get item {}: {}", id, e);
            ApiError::data(e, "Failed to get item")
        })?
        .ok_or_else(item_not_found)?;

    Ok((
        [(header::CACHE_CONTROL, "public, max-age=300")],
        Json(ApiResponse::ok(ItemView::detail(item))),
    ))
}

/// List the items of one seller, newest first
pub async fn list_seller_items(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<impl IntoResponse> {
    let seller_id = Uuid::parse_str(&seller_id)
        .map_err(|_| ApiError::Validation("Invalid seller ID".to_string()))?;
    let request = PageRequest::parse(query.limit.as_deref(), query.offset.as_deref(), SELLER_PAGE_LIMIT);

    let page = state
        .items
        .list_by_seller(seller_id, request)
        .await
        .map_err(|e| {
            error!("Failed to list items of seller {}: {}", seller_id, e);
            ApiError::data(e, "Failed to retrieve seller items")
        })?;

    Ok((
        [(header::CACHE_CONTROL, "public, max-age=120")],
        Json(listing(page, request).with_message("Seller items retrieved successfully")),
    ))
}

/// Create an item owned by the caller
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let condition = validate_new_item(&payload)?;

    if let Some(seller_id) = payload.seller_id.as_deref().filter(|s| !s.is_empty()) {
        if Uuid::parse_str(seller_id).ok() != Some(auth_user.id) {
            return Err(ApiError::Forbidden(
                "You can only create items for yourself".to_string(),
            ));
        }
    }

    let item = state
        .items
        .create(auth_user.id, &payload, condition)
        .await
        .map_err(|e| {
            error!("Failed to create item for {}: {}", auth_user.srn, e);
            ApiError::data(e, "Failed to create item")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ItemView::detail(item)).with_message("Item created successfully")),
    ))
}

/// Update an item owned by the caller
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_item_id(&id)?;
    let patch = ItemPatch::from_json(body).map_err(ApiError::Validation)?;
    validate_item_patch(&patch)?;

    let outcome = state
        .items
        .update(id, auth_user.id, patch.into_patch())
        .await
        .map_err(|e| {
            error!("Failed to update item {}: {}", id, e);
            ApiError::data(e, "Failed to update item")
        })?;

    match outcome {
        Mutation::Applied(item) => Ok(Json(
            ApiResponse::ok(ItemView::detail(item)).with_message("Item updated successfully"),
        )),
        Mutation::NotFound => Err(item_not_found()),
        Mutation::Forbidden => Err(ApiError::Forbidden(
            "You can only edit your own items".to_string(),
        )),
    }
}

/// Soft delete an item owned by the caller
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_item_id(&id)?;

    let outcome = state.items.delete(id, auth_user.id).await.map_err(|e| {
        error!("Failed to delete item {}: {}", id, e);
        ApiError::data(e, "Failed to delete item")
    })?;

    match outcome {
        Mutation::Applied(()) => Ok(Json(ApiResponse::message("Item deleted successfully"))),
        Mutation::NotFound => Err(item_not_found()),
        Mutation::Forbidden => Err(ApiError::Forbidden(
            "You can only delete your own items".to_string(),
        )),
    }
}
