//! Message and chat models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `messages` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    #[serde(default)]
    pub item_id: Option<Uuid>,
    #[serde(default, deserialize_with = "common::de::null_to_default")]
    pub is_read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub receiver_id: String,
    #[serde(default)]
    pub message: String,
    pub item_id: Option<Uuid>,
}

/// Body of `PUT /api/messages/read`
#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadRequest {
    pub other_user_id: Uuid,
    pub item_id: Option<Uuid>,
}

/// Query string of `GET /api/messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationQuery {
    pub other_user_id: Option<String>,
    pub item_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Latest message exchanged with one counterpart
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    /// `{user}-{counterpart}`
    pub id: String,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub last_message: Message,
    pub unread_count: u64,
    pub updated_at: DateTime<Utc>,
}
