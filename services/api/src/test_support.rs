//! Fixtures for handler tests: in-memory tables, a scripted identity
//! provider and an object store that records what it is given

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use auth::models::{PesuProfile, User};
use auth::{
    AuthError, AuthResult, AuthService, IdentityProvider, JwtConfig, JwtService, RateLimiter,
    RateLimiterConfig, UserRepository,
};
use axum::body::{Body, to_bytes};
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use common::database::MemoryStore;
use media::{ImageLimits, ImageUploader, MediaResult, ObjectStore};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::repositories::{ItemRepository, MessageRepository};
use crate::state::AppState;

pub const SECRET: &str = "handler-tests-secret-0123456789abcdef";

/// Identity provider that accepts one password and counts its calls
#[derive(Default)]
pub struct StubIdentity {
    pub calls: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<PesuProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if password != "correct-horse" {
            return Err(AuthError::AuthenticationFailed("Invalid credentials".to_string()));
        }
        Ok(PesuProfile {
            name: "Asha Rao".to_string(),
            srn: username.to_uppercase(),
            email: "asha@pesu.test".to_string(),
            ..Default::default()
        })
    }
}

/// Object store keeping object names in memory
#[derive(Default)]
pub struct RecordingStore {
    pub names: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, name: &str, _bytes: Bytes, _content_type: &str) -> MediaResult<String> {
        self.names.lock().await.push(name.to_string());
        Ok(format!("https://cdn.test/item-images/{}", name))
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: MemoryStore,
    pub identity: Arc<StubIdentity>,
    pub objects: Arc<RecordingStore>,
    jwt: JwtService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), RateLimiterConfig::general())
    }

    pub fn with_store(store: MemoryStore, general: RateLimiterConfig) -> Self {
        let tables: Arc<dyn common::database::TableStore> = Arc::new(store.clone());
        let identity = Arc::new(StubIdentity::default());
        let objects = Arc::new(RecordingStore::default());
        let jwt = JwtService::new(JwtConfig::from_secret(SECRET).unwrap());
        let users = UserRepository::new(tables.clone());

        let state = AppState {
            auth: AuthService::new(identity.clone(), users.clone(), jwt.clone()),
            users,
            items: ItemRepository::new(tables.clone()),
            messages: MessageRepository::new(tables),
            uploader: ImageUploader::new(objects.clone(), ImageLimits::default()),
            general_limiter: RateLimiter::new(general),
            auth_limiter: RateLimiter::new(RateLimiterConfig::auth()),
        };

        Self {
            state,
            store,
            identity,
            objects,
            jwt,
        }
    }

    /// Insert a profile row and return the user with a bearer token
    pub async fn user(&self, srn: &str) -> (User, String) {
        let now = Utc::now();
        let row = json!({
            "id": Uuid::new_v4(),
            "srn": srn,
            "name": format!("Student {}", srn),
            "email": format!("{}@pesu.test", srn.to_lowercase()),
            "verified": true,
            "created_at": now,
            "updated_at": now,
        });
        self.store.seed("user_profiles", [row.clone()]).await;
        let user: User = serde_json::from_value(row).unwrap();
        let token = self.jwt.generate_access_token(&user).unwrap();
        (user, format!("Bearer {}", token))
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    builder.body(Body::empty()).unwrap()
}
