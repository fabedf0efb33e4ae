//! Application state shared across handlers

use auth::{AuthService, RateLimiter, UserRepository};
use media::ImageUploader;

use crate::repositories::{ItemRepository, MessageRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserRepository,
    pub items: ItemRepository,
    pub messages: MessageRepository,
    pub uploader: ImageUploader,
    /// Budget shared by every `/api` route
    pub general_limiter: RateLimiter,
    /// Stricter budget for `/api/auth/*`
    pub auth_limiter: RateLimiter,
}
