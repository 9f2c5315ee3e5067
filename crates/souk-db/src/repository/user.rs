//! # User Repository
//!
//! Database operations for accounts and profiles.
//!
//! ## The Two-Table Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   users (credentials)              profiles (marketplace identity)     │
//! │   ┌───────────────────┐            ┌───────────────────┐               │
//! │   │ id                │ 1 ──── 0..1│ user_id           │               │
//! │   │ username (UNIQUE) │            │ role              │               │
//! │   │ email             │            │ phone             │               │
//! │   │ password_hash     │            └───────────────────┘               │
//! │   └───────────────────┘                                                │
//! │                                                                         │
//! │   Registration creates BOTH rows in one transaction. A user without    │
//! │   a profile is a data integrity gap: get_profile returns None and the  │
//! │   caller decides how loudly to fail.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use souk_core::{Profile, Role, User};

/// Repository for account and profile operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user and its profile atomically.
    ///
    /// ## Returns
    /// The created user. A duplicate username surfaces as
    /// `DbError::UniqueViolation`.
    pub async fn create_with_profile(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        phone: Option<&str>,
    ) -> DbResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(username = %username, role = %role, "Creating user with profile");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, role, phone)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&id)
        .bind(role)
        .bind(phone)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username (login lookup).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets the profile for a user.
    ///
    /// ## Returns
    /// `Ok(None)` when the profile row is missing. That includes the
    /// integrity-gap case of a user with no profile; callers map it to
    /// their own error rather than this layer guessing.
    pub async fn get_profile(&self, user_id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, role, phone
            FROM profiles
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let db = test_db().await;
        let repo = db.users();

        let user = repo
            .create_with_profile("awa", "awa@example.com", "hash", Role::Buyer, Some("+2250712345"))
            .await
            .unwrap();

        let fetched = repo.get_by_username("awa").await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.email, "awa@example.com");

        let profile = repo.get_profile(&user.id).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Buyer);
        assert_eq!(profile.phone.as_deref(), Some("+2250712345"));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let db = test_db().await;
        let repo = db.users();

        repo.create_with_profile("awa", "a@example.com", "h1", Role::Buyer, None)
            .await
            .unwrap();

        let err = repo
            .create_with_profile("awa", "b@example.com", "h2", Role::Seller, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let db = test_db().await;
        let repo = db.users();

        // Insert a bare user row without a profile
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES ('u-orphan', 'orphan', 'o@example.com', 'h', '2026-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(repo.get_profile("u-orphan").await.unwrap().is_none());
        assert!(repo.get_by_id("u-orphan").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let db = test_db().await;
        assert!(db.users().get_by_id("nope").await.unwrap().is_none());
        assert!(db.users().get_by_username("nope").await.unwrap().is_none());
    }
}
