//! # Traffic Repository
//!
//! Daily visit counters for the admin dashboard.
//!
//! One row per UTC day, upserted on every request by the session
//! middleware. `visitors` counts new sessions, `page_views` counts
//! requests.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::DbResult;
use souk_core::SiteTraffic;

/// Repository for site traffic counters.
#[derive(Debug, Clone)]
pub struct TrafficRepository {
    pool: SqlitePool,
}

impl TrafficRepository {
    /// Creates a new TrafficRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TrafficRepository { pool }
    }

    /// Records one request against a day's counters.
    ///
    /// `new_visitor` is true when the request created a fresh session.
    pub async fn record_visit(&self, day: NaiveDate, new_visitor: bool) -> DbResult<()> {
        let visitor_inc: i64 = if new_visitor { 1 } else { 0 };

        sqlx::query(
            r#"
            INSERT INTO site_traffic (day, visitors, page_views)
            VALUES (?1, ?2, 1)
            ON CONFLICT(day) DO UPDATE SET
                visitors = visitors + ?2,
                page_views = page_views + 1
            "#,
        )
        .bind(day)
        .bind(visitor_inc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recent `days` rows, newest first.
    pub async fn list_recent(&self, days: i64) -> DbResult<Vec<SiteTraffic>> {
        let rows = sqlx::query_as::<_, SiteTraffic>(
            r#"
            SELECT day, visitors, page_views
            FROM site_traffic
            ORDER BY day DESC
            LIMIT ?1
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All-time (visitors, page_views) totals.
    pub async fn totals(&self) -> DbResult<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(visitors), 0), COALESCE(SUM(page_views), 0) FROM site_traffic",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
