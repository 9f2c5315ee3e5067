//! # souk-db: Database Layer for Souk Market
//!
//! This crate provides database access for the Souk Market application.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Souk Market Data Flow                             │
//! │                                                                         │
//! │  HTTP Handler (e.g. checkout)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     souk-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (listing.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ UserRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ ListingRepo   │    │ ...          │  │   │
//! │  │   │ Management    │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (souk.db)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, listing, order, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use souk_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/souk.db");
//! let db = Database::new(config).await?;
//!
//! let listings = db.listings().list_active(&ListingFilter::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::comment::CommentRepository;
pub use repository::listing::{ListingFilter, ListingRepository};
pub use repository::message::MessageRepository;
pub use repository::order::OrderRepository;
pub use repository::traffic::TrafficRepository;
pub use repository::user::UserRepository;
