//! # Comment Repository
//!
//! Database operations for star-rated reviews.
//!
//! Ratings are validated in souk-core before they get here; the CHECK
//! constraint on the table is the last line of defense, not the first.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use souk_core::Comment;

/// Repository for comment database operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    /// Creates a new CommentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CommentRepository { pool }
    }

    /// Inserts a comment. Content and rating arrive already validated.
    pub async fn insert(
        &self,
        listing_id: &str,
        user_id: &str,
        content: &str,
        rating: i64,
    ) -> DbResult<Comment> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            rating,
            created_at: Utc::now(),
        };

        debug!(id = %comment.id, listing = %listing_id, rating, "Inserting comment");

        sqlx::query(
            r#"
            INSERT INTO comments (id, listing_id, user_id, content, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.listing_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(comment.rating)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    /// All comments on a listing, newest first.
    pub async fn list_for_listing(&self, listing_id: &str) -> DbResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, listing_id, user_id, content, rating, created_at
            FROM comments
            WHERE listing_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Average star rating for a listing, `None` when it has no comments.
    pub async fn average_rating(&self, listing_id: &str) -> DbResult<Option<f64>> {
        let avg: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM comments WHERE listing_id = ?1")
                .bind(listing_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(avg)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use souk_core::{Listing, ListingCategory, ListingType, Role};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(db: &Database) -> (String, String) {
        let seller = db
            .users()
            .create_with_profile("moussa", "m@example.com", "hash", Role::Seller, None)
            .await
            .unwrap()
            .id;
        let buyer = db
            .users()
            .create_with_profile("awa", "a@example.com", "hash", Role::Buyer, None)
            .await
            .unwrap()
            .id;

        let now = Utc::now();
        let l = Listing {
            id: Uuid::new_v4().to_string(),
            seller_id: seller,
            title: "Plot".to_string(),
            description: "A fine plot".to_string(),
            price_cents: 100_000,
            category: ListingCategory::Land,
            listing_type: ListingType::Sale,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.listings().insert(&l).await.unwrap();
        (l.id, buyer)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_db().await;
        let (listing_id, buyer) = seed(&db).await;

        db.comments()
            .insert(&listing_id, &buyer, "Great location", 5)
            .await
            .unwrap();
        db.comments()
            .insert(&listing_id, &buyer, "On second thought, decent", 3)
            .await
            .unwrap();

        // repeat comments from the same user are allowed
        let comments = db.comments().list_for_listing(&listing_id).await.unwrap();
        assert_eq!(comments.len(), 2);
    }

    #[tokio::test]
    async fn test_average_rating() {
        let db = test_db().await;
        let (listing_id, buyer) = seed(&db).await;

        assert!(db
            .comments()
            .average_rating(&listing_id)
            .await
            .unwrap()
            .is_none());

        db.comments()
            .insert(&listing_id, &buyer, "Great location", 5)
            .await
            .unwrap();
        db.comments()
            .insert(&listing_id, &buyer, "Decent enough", 3)
            .await
            .unwrap();

        let avg = db
            .comments()
            .average_rating(&listing_id)
            .await
            .unwrap()
            .unwrap();
        assert!((avg - 4.0).abs() < f64::EPSILON);
    }
}
