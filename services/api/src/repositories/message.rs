//! Message repository for data service operations

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::database::{Direction, Filter, Query, TableStore, decode_echo, decode_rows};
use common::error::DataResult;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::models::{ChatSummary, Message};
use crate::validation::PageRequest;

const TABLE: &str = "messages";

/// One page of a conversation
#[derive(Debug, Clone)]
pub struct Conversation {
    pub messages: Vec<Message>,
    pub total: u64,
}

/// Message repository
#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<dyn TableStore>,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Store a message from `sender` to `receiver`
    pub async fn send(
        &self,
        sender: Uuid,
        receiver: Uuid,
        body: &str,
        item_id: Option<Uuid>,
    ) -> DataResult<Message> {
        let row = json!({
            "id": Uuid::new_v4(),
            "sender_id": sender,
            "receiver_id": receiver,
            "message": body.trim(),
            "item_id": item_id,
            "is_read": false,
            "created_at": Utc::now(),
        });
        let rows = self.store.insert(TABLE, &row).await?;
        let message: Message = decode_echo(TABLE, rows)?;
        info!("Message {} sent from {} to {}", message.id, sender, receiver);
        Ok(message)
    }

    /// Messages exchanged between `user` and `other` in both directions,
    /// oldest first
    pub async fn conversation(
        &self,
        user: Uuid,
        other: Uuid,
        item_id: Option<Uuid>,
        page: PageRequest,
    ) -> DataResult<Conversation> {
        let (user, other) = (user.to_string(), other.to_string());
        let mut query = Query::new()
            .filter(Filter::any_of(vec![
                vec![
                    Filter::eq("sender_id", user.as_str()),
                    Filter::eq("receiver_id", other.as_str()),
                ],
                vec![
                    Filter::eq("sender_id", other.as_str()),
                    Filter::eq("receiver_id", user.as_str()),
                ],
            ]))
            .order_by("created_at", Direction::Asc)
            .range(page.offset, page.limit)
            .with_count();
        if let Some(item_id) = item_id {
            query = query.filter(Filter::eq("item_id", item_id.to_string()));
        }

        let result = self.store.select(TABLE, &query).await?;
        let messages: Vec<Message> = decode_rows(result.rows)?;
        let seen = page.offset + messages.len() as u64;
        let total = result.total.map_or(seen, |total| total.max(seen));

        Ok(Conversation { messages, total })
    }

    /// Mark unread messages from `sender` to `receiver` as read.
    ///
    /// Returns how many messages changed; repeating the call changes nothing.
    pub async fn mark_read(
        &self,
        receiver: Uuid,
        sender: Uuid,
        item_id: Option<Uuid>,
    ) -> DataResult<usize> {
        let mut filters = vec![
            Filter::eq("receiver_id", receiver.to_string()),
            Filter::eq("sender_id", sender.to_string()),
            Filter::eq("is_read", false),
        ];
        if let Some(item_id) = item_id {
            filters.push(Filter::eq("item_id", item_id.to_string()));
        }

        let patch = json!({ "is_read": true, "read_at": Utc::now() });
        let rows = self.store.update(TABLE, &filters, &patch).await?;
        Ok(rows.len())
    }

    /// One chat per counterpart, carrying the latest message, newest first
    pub async fn active_chats(&self, user: Uuid) -> DataResult<Vec<ChatSummary>> {
        let me = user.to_string();
        let query = Query::new()
            .filter(Filter::any_of(vec![
                vec![Filter::eq("sender_id", me.as_str())],
                vec![Filter::eq("receiver_id", me.as_str())],
            ]))
            .order_by("created_at", Direction::Desc);
        let page = self.store.select(TABLE, &query).await?;
        let messages: Vec<Message> = decode_rows(page.rows)?;

        let mut chats: Vec<ChatSummary> = Vec::new();
        let mut by_counterpart: HashMap<Uuid, usize> = HashMap::new();

        for message in messages {
            let other = if message.sender_id == user {
                message.receiver_id
            } else {
                message.sender_id
            };
            let unread = message.receiver_id == user && !message.is_read;

            match by_counterpart.get(&other) {
                Some(&index) => {
                    if unread {
                        chats[index].unread_count += 1;
                    }
                }
                None => {
                    by_counterpart.insert(other, chats.len());
                    chats.push(ChatSummary {
                        id: format!("{}-{}", user, other),
                        user1_id: user,
                        user2_id: other,
                        updated_at: message.created_at,
                        unread_count: u64::from(unread),
                        last_message: message,
                    });
                }
            }
        }

        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }
}
