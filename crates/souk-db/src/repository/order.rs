//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Who Sees Which Orders
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   list_by_buyer(buyer)    WHERE buyer_id = ?                            │
//! │   list_for_seller(seller) JOIN listings ON seller_id = ?                │
//! │   list_all()              (admin dashboard)                             │
//! │                                                                         │
//! │   Status writes go through update_status AFTER the transition has      │
//! │   been validated in souk_core::Order::confirm - the repository never   │
//! │   decides whether a transition is legal.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use souk_core::{Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, buyer_id, listing_id, amount_cents, \
    first_name, last_name, phone, neighborhood, city, status, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order. The order arrives fully built from checkout,
    /// snapshot amount and contact fields included.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, buyer = %order.buyer_id, amount_cents = order.amount_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, buyer_id, listing_id, amount_cents,
                first_name, last_name, phone, neighborhood, city,
                status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order.id)
        .bind(&order.buyer_id)
        .bind(&order.listing_id)
        .bind(order.amount_cents)
        .bind(&order.first_name)
        .bind(&order.last_name)
        .bind(&order.phone)
        .bind(&order.neighborhood)
        .bind(&order.city)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists a buyer's orders, newest first.
    pub async fn list_by_buyer(&self, buyer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists all orders on a seller's listings, newest first.
    pub async fn list_for_seller(&self, seller_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.id, o.buyer_id, o.listing_id, o.amount_cents,
                   o.first_name, o.last_name, o.phone, o.neighborhood, o.city,
                   o.status, o.created_at
            FROM orders o
            INNER JOIN listings l ON l.id = o.listing_id
            WHERE l.seller_id = ?1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists every order, newest first (admin dashboard).
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Persists a status that was already validated by the domain layer.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating order status");

        sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Counts a buyer's orders per status (buyer dashboard header).
    pub async fn count_by_status_for_buyer(
        &self,
        buyer_id: &str,
        status: OrderStatus,
    ) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE buyer_id = ?1 AND status = ?2")
                .bind(buyer_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
