//! API models for request and response payloads

pub mod envelope;
pub mod item;
pub mod message;

pub use envelope::{ApiResponse, PaginatedResponse, Pagination};
pub use item::{CreateItemRequest, Item, ItemPatch, ItemQuery, ItemView};
pub use message::{ChatSummary, ConversationQuery, MarkReadRequest, Message, SendMessageRequest};
