//! # Listing Repository
//!
//! Database operations for listings, their images, and the catalog filter.
//!
//! ## Catalog Filtering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  How the Catalog Query Is Built                         │
//! │                                                                         │
//! │  ListingFilter { category, listing_type, min_price, max_price }        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM listings WHERE is_active = 1                          │
//! │       ├── category?      AND category = ?                              │
//! │       ├── listing_type?  AND listing_type = ?                          │
//! │       ├── min_price?     AND price_cents >= ?                          │
//! │       └── max_price?     AND price_cents <= ?                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ORDER BY created_at DESC                                              │
//! │                                                                         │
//! │  Each clause is added only when the filter field is present, so the    │
//! │  HTTP layer can drop a malformed filter value and the query simply     │
//! │  ignores that dimension.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use souk_core::{Listing, ListingCategory, ListingImage, ListingType};

/// Optional catalog filter dimensions. `None` means "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub category: Option<ListingCategory>,
    pub listing_type: Option<ListingType>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
}

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ListingRepository { pool }
    }

    /// Inserts a listing.
    pub async fn insert(&self, listing: &Listing) -> DbResult<()> {
        debug!(id = %listing.id, seller = %listing.seller_id, "Inserting listing");

        sqlx::query(
            r#"
            INSERT INTO listings (
                id, seller_id, title, description, price_cents,
                category, listing_type, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&listing.id)
        .bind(&listing.seller_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price_cents)
        .bind(listing.category)
        .bind(listing.listing_type)
        .bind(listing.is_active)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the editable fields of a listing and bumps `updated_at`.
    ///
    /// Ownership is checked by the caller before this runs; the query
    /// itself is scoped to the id only.
    pub async fn update(
        &self,
        id: &str,
        title: &str,
        description: &str,
        price_cents: i64,
        category: ListingCategory,
        listing_type: ListingType,
    ) -> DbResult<()> {
        debug!(id = %id, "Updating listing");

        sqlx::query(
            r#"
            UPDATE listings
            SET title = ?1, description = ?2, price_cents = ?3,
                category = ?4, listing_type = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(price_cents)
        .bind(category)
        .bind(listing_type)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes a listing.
    ///
    /// The row stays so existing orders keep a valid foreign key; the
    /// listing just stops appearing in catalog reads.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating listing");

        sqlx::query("UPDATE listings SET is_active = 0, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a listing by ID regardless of its active flag.
    ///
    /// Used for ownership checks and order history lookups.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, seller_id, title, description, price_cents,
                   category, listing_type, is_active, created_at, updated_at
            FROM listings
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Gets an active listing by ID.
    ///
    /// Catalog detail pages and add-to-cart go through this: an inactive
    /// listing reads as absent, not as "present but hidden".
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, seller_id, title, description, price_cents,
                   category, listing_type, is_active, created_at, updated_at
            FROM listings
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Lists active listings matching the filter, newest first.
    pub async fn list_active(&self, filter: &ListingFilter) -> DbResult<Vec<Listing>> {
        debug!(?filter, "Listing active catalog");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, seller_id, title, description, price_cents, \
             category, listing_type, is_active, created_at, updated_at \
             FROM listings WHERE is_active = 1",
        );

        if let Some(category) = filter.category {
            qb.push(" AND category = ").push_bind(category);
        }
        if let Some(listing_type) = filter.listing_type {
            qb.push(" AND listing_type = ").push_bind(listing_type);
        }
        if let Some(min) = filter.min_price_cents {
            qb.push(" AND price_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price_cents {
            qb.push(" AND price_cents <= ").push_bind(max);
        }

        qb.push(" ORDER BY created_at DESC");

        let listings = qb
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = listings.len(), "Catalog query returned listings");
        Ok(listings)
    }

    /// Lists a seller's listings (active and inactive), newest first.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, seller_id, title, description, price_cents,
                   category, listing_type, is_active, created_at, updated_at
            FROM listings
            WHERE seller_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Attaches an image record to a listing.
    pub async fn add_image(&self, listing_id: &str, path: &str, position: i64) -> DbResult<ListingImage> {
        let image = ListingImage {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.to_string(),
            path: path.to_string(),
            position,
        };

        sqlx::query(
            "INSERT INTO listing_images (id, listing_id, path, position) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&image.id)
        .bind(&image.listing_id)
        .bind(&image.path)
        .bind(image.position)
        .execute(&self.pool)
        .await?;

        Ok(image)
    }

    /// All images for a listing, in display order.
    pub async fn images_for(&self, listing_id: &str) -> DbResult<Vec<ListingImage>> {
        let images = sqlx::query_as::<_, ListingImage>(
            r#"
            SELECT id, listing_id, path, position
            FROM listing_images
            WHERE listing_id = ?1
            ORDER BY position
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// The first image of a listing, if any. This is what the cart snapshots.
    pub async fn first_image(&self, listing_id: &str) -> DbResult<Option<ListingImage>> {
        let image = sqlx::query_as::<_, ListingImage>(
            r#"
            SELECT id, listing_id, path, position
            FROM listing_images
            WHERE listing_id = ?1
            ORDER BY position
            LIMIT 1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use souk_core::Role;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_seller(db: &Database, username: &str) -> String {
        db.users()
            .create_with_profile(
                username,
                &format!("{username}@example.com"),
                "hash",
                Role::Seller,
                None,
            )
            .await
            .unwrap()
            .id
    }

    fn listing(seller_id: &str, title: &str, price_cents: i64) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.to_string(),
            title: title.to_string(),
            description: "A fine property".to_string(),
            price_cents,
            category: ListingCategory::Land,
            listing_type: ListingType::Sale,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        let l = listing(&seller, "Plot in Cocody", 500_000);
        repo.insert(&l).await.unwrap();

        let fetched = repo.get_active(&l.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Plot in Cocody");
        assert_eq!(fetched.price_cents, 500_000);
    }

    #[tokio::test]
    async fn test_deactivated_listing_hidden_from_catalog() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        let l = listing(&seller, "Plot", 100_000);
        repo.insert(&l).await.unwrap();
        repo.deactivate(&l.id).await.unwrap();

        assert!(repo.get_active(&l.id).await.unwrap().is_none());
        // Still reachable for order history
        assert!(repo.get_by_id(&l.id).await.unwrap().is_some());
        assert!(repo
            .list_active(&ListingFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_price_range() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        repo.insert(&listing(&seller, "Cheap", 100_000)).await.unwrap();
        repo.insert(&listing(&seller, "Mid", 500_000)).await.unwrap();
        repo.insert(&listing(&seller, "Dear", 900_000)).await.unwrap();

        let filter = ListingFilter {
            min_price_cents: Some(200_000),
            max_price_cents: Some(800_000),
            ..Default::default()
        };
        let results = repo.list_active(&filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Mid");
    }

    #[tokio::test]
    async fn test_filter_by_category_and_type() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        let mut house = listing(&seller, "House", 300_000);
        house.category = ListingCategory::HouseRent;
        house.listing_type = ListingType::Rent;
        repo.insert(&house).await.unwrap();
        repo.insert(&listing(&seller, "Land", 300_000)).await.unwrap();

        let filter = ListingFilter {
            category: Some(ListingCategory::HouseRent),
            listing_type: Some(ListingType::Rent),
            ..Default::default()
        };
        let results = repo.list_active(&filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "House");
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_timestamp() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        let l = listing(&seller, "Old title", 100_000);
        repo.insert(&l).await.unwrap();

        repo.update(
            &l.id,
            "New title",
            "New description",
            250_000,
            ListingCategory::HouseSale,
            ListingType::Sale,
        )
        .await
        .unwrap();

        let fetched = repo.get_by_id(&l.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New title");
        assert_eq!(fetched.price_cents, 250_000);
        assert_eq!(fetched.category, ListingCategory::HouseSale);
        assert!(fetched.updated_at >= l.updated_at);
    }

    #[tokio::test]
    async fn test_images_ordered_and_first() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let repo = db.listings();

        let l = listing(&seller, "Plot", 100_000);
        repo.insert(&l).await.unwrap();

        repo.add_image(&l.id, "media/b.jpg", 1).await.unwrap();
        repo.add_image(&l.id, "media/a.jpg", 0).await.unwrap();

        let images = repo.images_for(&l.id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].path, "media/a.jpg");

        let first = repo.first_image(&l.id).await.unwrap().unwrap();
        assert_eq!(first.path, "media/a.jpg");
        assert!(repo.first_image("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_seller_includes_inactive() {
        let db = test_db().await;
        let seller = seed_seller(&db, "moussa").await;
        let other = seed_seller(&db, "fatou").await;
        let repo = db.listings();

        let l1 = listing(&seller, "Active", 100_000);
        let l2 = listing(&seller, "Retired", 100_000);
        repo.insert(&l1).await.unwrap();
        repo.insert(&l2).await.unwrap();
        repo.deactivate(&l2.id).await.unwrap();
        repo.insert(&listing(&other, "Other seller", 100_000))
            .await
            .unwrap();

        let mine = repo.list_by_seller(&seller).await.unwrap();
        assert_eq!(mine.len(), 2);
    }
}
