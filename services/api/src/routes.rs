//! API service routes

pub mod auth;
pub mod images;
pub mod items;
pub mod messages;
pub mod profile;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    middleware::{auth_middleware, auth_rate_limit_middleware, rate_limit_middleware},
    state::AppState,
};

/// Body limit of JSON routes
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;
/// Body limit of the multipart upload route: five 5 MiB images plus form overhead
pub const UPLOAD_BODY_LIMIT: usize = 26 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/pesu", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/check-srn", get(auth::check_srn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/profile/:id", get(profile::get_profile))
        .route("/items", get(items::list_items))
        .route("/items/:id", get(items::get_item))
        .route("/items/:id/image/:index", get(images::get_item_image))
        .route("/items/seller/:seller_id", get(items::list_seller_items));

    let protected_routes = Router::new()
        .route("/profile/:id", put(profile::update_profile))
        .route("/items", post(items::create_item))
        .route(
            "/items/:id",
            put(items::update_item).delete(items::delete_item),
        )
        .route(
            "/items/upload-images",
            post(images::upload_images).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/items/convert-images", post(images::convert_images))
        .route(
            "/messages",
            post(messages::send_message).get(messages::get_messages),
        )
        .route("/messages/read", put(messages::mark_as_read))
        .route("/active-chats", get(messages::active_chats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "pesxchange-backend"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, get, json_body, json_request};
    use ::auth::RateLimiterConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use common::database::MemoryStore;
    use futures::stream;
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    const PNG: &[u8] = b"\x89PNG\r\n\x1A\n\x00\x00\x00\rIHDR";

    fn lamp() -> Value {
        json!({
            "title": "Desk Lamp",
            "description": "Barely used desk lamp",
            "price": 500,
            "condition": "Good",
        })
    }

    fn multipart(token: &str, files: &[(&str, Vec<u8>)]) -> Request<Body> {
        let boundary = "pesxchange-test-boundary";
        let mut body = Vec::new();
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    boundary, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        // Delivered in chunks so the body limit applies as the form is parsed
        let chunks: Vec<Result<Bytes, std::io::Error>> = body
            .chunks(64 * 1024)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();

        Request::builder()
            .method("POST")
            .uri("/api/items/upload-images")
            .header("authorization", token)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from_stream(stream::iter(chunks)))
            .unwrap()
    }

    async fn create_lamp(harness: &Harness, token: &str) -> Value {
        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some(token), lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["data"].clone()
    }

    #[tokio::test]
    async fn test_health_check() {
        let harness = Harness::new();
        for uri in ["/health", "/api/health"] {
            let response = create_router(harness.state.clone())
                .oneshot(get(uri, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["service"], "pesxchange-backend");
        }
    }

    #[tokio::test]
    async fn test_create_item_uses_default_location() {
        let harness = Harness::new();
        let (user, token) = harness.user("PES1UG21CS001").await;

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some(&token), lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Item created successfully");
        assert_eq!(body["data"]["location"], "PES University, Bangalore");
        assert_eq!(body["data"]["seller_id"], user.id.to_string());
        assert_eq!(body["data"]["is_available"], true);
    }

    #[tokio::test]
    async fn test_created_item_can_be_fetched() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let created = create_lamp(&harness, &token).await;
        let id = created["id"].as_str().unwrap();

        let response = create_router(harness.state.clone())
            .oneshot(get(&format!("/api/items/{}", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["cache-control"],
            "public, max-age=300"
        );
        let body = json_body(response).await;
        assert_eq!(body["data"]["title"], "Desk Lamp");
        assert_eq!(body["data"]["price"], 500.0);
    }

    #[tokio::test]
    async fn test_create_item_rejects_invalid_fields() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let mut payload = lamp();
        payload["price"] = json!(0);

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some(&token), payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "price must be greater than 0");
    }

    #[tokio::test]
    async fn test_only_owner_can_update() {
        let harness = Harness::new();
        let (_, owner) = harness.user("PES1UG21CS001").await;
        let (_, other) = harness.user("PES1UG21CS002").await;
        let created = create_lamp(&harness, &owner).await;
        let uri = format!("/api/items/{}", created["id"].as_str().unwrap());

        let response = create_router(harness.state.clone())
            .oneshot(json_request("PUT", &uri, Some(&other), json!({"price": 1})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"], "You can only edit your own items");

        let rows = harness.store.rows("items").await;
        assert_eq!(rows[0]["price"], 500.0);

        let response = create_router(harness.state.clone())
            .oneshot(json_request("PUT", &uri, Some(&owner), json!({"price": 450})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["price"], 450.0);
    }

    #[tokio::test]
    async fn test_deleted_item_is_hidden() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let created = create_lamp(&harness, &token).await;
        let uri = format!("/api/items/{}", created["id"].as_str().unwrap());

        let response = create_router(harness.state.clone())
            .oneshot(json_request("DELETE", &uri, Some(&token), json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = create_router(harness.state.clone())
            .oneshot(get(&uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Item not found");
    }

    #[tokio::test]
    async fn test_listing_pagination() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        for _ in 0..5 {
            create_lamp(&harness, &token).await;
        }

        let response = create_router(harness.state.clone())
            .oneshot(get("/api/items?limit=2&offset=4", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["limit"], 2);
        assert_eq!(body["pagination"]["offset"], 4);
        assert_eq!(body["pagination"]["total"], 5);
    }

    #[tokio::test]
    async fn test_missing_write_echo_is_retryable() {
        let harness = Harness::with_store(MemoryStore::without_echo(), RateLimiterConfig::general());
        let (_, token) = harness.user("PES1UG21CS001").await;

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some(&token), lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_authorization_header_messages() {
        let harness = Harness::new();

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", None, lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Authorization header required"
        );

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some("Token abc"), lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid authorization header format"
        );

        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some("Bearer not.a.jwt"), lamp()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_too_many_uploads_rejected() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let files: Vec<(&str, Vec<u8>)> = (0..6).map(|_| ("a.png", PNG.to_vec())).collect();

        let response = create_router(harness.state.clone())
            .oneshot(multipart(&token, &files))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Maximum 5 images allowed per upload"
        );
        assert!(harness.objects.names.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_partial_success() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let mut big = PNG.to_vec();
        big.resize(6 * 1024 * 1024, 0);

        let response = create_router(harness.state.clone())
            .oneshot(multipart(&token, &[("big.png", big), ("small.png", PNG.to_vec())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["data"]["urls"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["message"],
            "Uploaded 1 images, rejected 1: big.png (exceeds 5MB limit)"
        );
        assert_eq!(harness.objects.names.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_messages_round_trip_and_mark_read() {
        let harness = Harness::new();
        let (buyer, buyer_token) = harness.user("PES1UG21CS001").await;
        let (seller, seller_token) = harness.user("PES1UG21CS002").await;

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/messages",
                Some(&buyer_token),
                json!({"receiver_id": seller.id, "message": "Is the lamp available?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = create_router(harness.state.clone())
            .oneshot(get("/api/active-chats", Some(&seller_token)))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"][0]["unread_count"], 1);
        assert_eq!(body["data"][0]["user2_id"], buyer.id.to_string());

        for _ in 0..2 {
            let response = create_router(harness.state.clone())
                .oneshot(json_request(
                    "PUT",
                    "/api/messages/read",
                    Some(&seller_token),
                    json!({"other_user_id": buyer.id}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await["message"], "Messages marked as read");
        }

        let rows = harness.store.rows("messages").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_read"], true);

        let response = create_router(harness.state.clone())
            .oneshot(get(
                &format!("/api/messages?other_user_id={}", seller.id),
                Some(&buyer_token),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["message"], "Is the lamp available?");
    }

    #[tokio::test]
    async fn test_message_to_self_rejected() {
        let harness = Harness::new();
        let (user, token) = harness.user("PES1UG21CS001").await;

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/messages",
                Some(&token),
                json!({"receiver_id": user.id, "message": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Cannot send message to yourself"
        );
    }

    #[tokio::test]
    async fn test_malformed_srn_never_reaches_provider() {
        let harness = Harness::new();

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/auth/pesu",
                None,
                json!({"username": "not-an-srn", "password": "correct-horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.identity.calls.load(Ordering::SeqCst), 0);

        let response = create_router(harness.state.clone())
            .oneshot(get("/api/auth/check-srn?srn=bogus", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid SRN format");
    }

    #[tokio::test]
    async fn test_login_issues_tokens() {
        let harness = Harness::new();

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/auth/pesu",
                None,
                json!({"username": "pes1ug21cs042", "password": "correct-horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["user"]["srn"], "PES1UG21CS042");
        assert_eq!(body["data"]["expires_in"], 24 * 60 * 60);
        assert_eq!(body["data"]["refresh_expires_in"], 7 * 24 * 60 * 60);
        let token = body["data"]["token"].as_str().unwrap();

        let response = create_router(harness.state.clone())
            .oneshot(get("/api/active-chats", Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_general_rate_limit() {
        let harness = Harness::with_store(
            MemoryStore::new(),
            RateLimiterConfig {
                max_requests: 2,
                window_seconds: 60,
            },
        );
        let app = create_router(harness.state.clone());
        let request = || {
            Request::builder()
                .uri("/api/items")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(
            json_body(response).await["error"],
            "Rate limit exceeded. Please try again later."
        );

        // The top-level health check is outside the budget
        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    #[tokio::test]
    async fn test_sixth_large_upload_part_is_refused_before_reading() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let mut large = PNG.to_vec();
        large.resize(4 * 1024 * 1024 + 512 * 1024, 0);
        let files: Vec<(&str, Vec<u8>)> = (0..6).map(|_| ("photo.png", large.clone())).collect();

        let response = create_router(harness.state.clone())
            .oneshot(multipart(&token, &files))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Maximum 5 images allowed per upload"
        );
        assert!(harness.objects.names.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_item_image_redirects_or_describes_inline_data() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let mut payload = lamp();
        payload["images"] = json!([
            "https://cdn.test/item-images/lamp.png",
            "data:image/png;base64,AAAA"
        ]);
        let response = create_router(harness.state.clone())
            .oneshot(json_request("POST", "/api/items", Some(&token), payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = create_router(harness.state.clone())
            .oneshot(get(&format!("/api/items/{}/image/0", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()["location"],
            "https://cdn.test/item-images/lamp.png"
        );

        let response = create_router(harness.state.clone())
            .oneshot(get(&format!("/api/items/{}/image/1", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["type"], "image/png");
        assert_eq!(body["data"]["index"], 1);
        assert_eq!(body["data"]["size"], "data:image/png;base64,AAAA".len());

        for index in ["2", "-1"] {
            let response = create_router(harness.state.clone())
                .oneshot(get(&format!("/api/items/{}/image/{}", id, index), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(json_body(response).await["error"], "Image not found");
        }

        let response = create_router(harness.state.clone())
            .oneshot(get(&format!("/api/items/{}/image/first", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid image index");
    }

    #[tokio::test]
    async fn test_profile_update_rules() {
        let harness = Harness::new();
        let (owner, token) = harness.user("PES1UG21CS001").await;
        let (other, _) = harness.user("PES1UG21CS002").await;

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "PUT",
                &format!("/api/profile/{}", other.id),
                Some(&token),
                json!({"bio": "Selling my old books"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await["error"],
            "You can only update your own profile"
        );

        let uri = format!("/api/profile/{}", owner.id);
        let response = create_router(harness.state.clone())
            .oneshot(json_request("PUT", &uri, Some(&token), json!({"favourite_colour": "teal"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "PUT",
                &uri,
                Some(&token),
                json!({"srn": "PES1UG21CS999", "verified": false}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No valid fields to update");

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "PUT",
                &uri,
                Some(&token),
                json!({"srn": "PES1UG21CS999", "bio": "  Final year CSE  "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["data"]["bio"], "Final year CSE");
        assert_eq!(body["data"]["srn"], "PES1UG21CS001");
    }

    #[tokio::test]
    async fn test_convert_images_stores_inline_entries() {
        let harness = Harness::new();
        let (_, token) = harness.user("PES1UG21CS001").await;
        let kept = "https://cdn.test/item-images/existing.png";

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/items/convert-images",
                Some(&token),
                json!({"images": [kept, "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg=="]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let urls = body["data"]["urls"].as_array().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], kept);
        assert!(urls[1].as_str().unwrap().starts_with("https://cdn.test/item-images/"));
        assert_eq!(harness.objects.names.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_accepts_only_refresh_tokens() {
        let harness = Harness::new();

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/auth/pesu",
                None,
                json!({"username": "pes1ug21cs042", "password": "correct-horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let access = body["data"]["token"].as_str().unwrap().to_string();
        let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/auth/refresh",
                None,
                json!({"refresh_token": refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["data"]["expires_in"], 24 * 60 * 60);

        let response = create_router(harness.state.clone())
            .oneshot(json_request(
                "POST",
                "/api/auth/refresh",
                None,
                json!({"refresh_token": access}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_seller_listing() {
        let harness = Harness::new();
        let (seller, token) = harness.user("PES1UG21CS001").await;
        let (_, other) = harness.user("PES1UG21CS002").await;
        create_lamp(&harness, &token).await;
        create_lamp(&harness, &token).await;
        create_lamp(&harness, &other).await;

        let response = create_router(harness.state.clone())
            .oneshot(get(&format!("/api/items/seller/{}", seller.id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Seller items retrieved successfully");
        assert_eq!(body["pagination"]["limit"], 50);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let response = create_router(harness.state.clone())
            .oneshot(get("/api/items/seller/not-a-uuid", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid seller ID");
    }
}
