//! Repositories for data service operations
//!
//! User profiles live in the `auth` crate; items and messages are owned by
//! this service.

pub mod item;
pub mod message;

pub use item::{ItemPage, ItemRepository, Mutation};
pub use message::{Conversation, MessageRepository};
