//! Authentication service models

pub mod pesu;
pub mod user;

// Re-export for convenience
pub use pesu::{PesuAuthResponse, PesuProfile};
pub use user::{DEFAULT_LOCATION, ProfileUpdate, User};
