//! # Message Repository
//!
//! Database operations for per-listing message threads.
//!
//! Messages are append-only. `is_read` is stored for forward compatibility
//! but no current workflow toggles it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use souk_core::Message;

/// Repository for message database operations.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Creates a new MessageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MessageRepository { pool }
    }

    /// Inserts a message. Content arrives already validated.
    pub async fn insert(
        &self,
        listing_id: &str,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
    ) -> DbResult<Message> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.to_string(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        debug!(id = %message.id, listing = %listing_id, "Inserting message");

        sqlx::query(
            r#"
            INSERT INTO messages (id, listing_id, sender_id, recipient_id, content, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&message.id)
        .bind(&message.listing_id)
        .bind(&message.sender_id)
        .bind(&message.recipient_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    /// The thread a user can see on a listing: messages they sent or
    /// received, oldest first.
    pub async fn list_for_listing_involving(
        &self,
        listing_id: &str,
        user_id: &str,
    ) -> DbResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, listing_id, sender_id, recipient_id, content, is_read, created_at
            FROM messages
            WHERE listing_id = ?1 AND (sender_id = ?2 OR recipient_id = ?2)
            ORDER BY created_at
            "#,
        )
        .bind(listing_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
