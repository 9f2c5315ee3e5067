//! # Repository Module
//!
//! Database repository implementations for Souk Market.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.listings().list_active(&filter)                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ListingRepository                                                     │
//! │  ├── list_active(&self, filter)                                        │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, listing)                                            │
//! │  └── deactivate(&self, id)                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Handlers stay readable                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and profiles
//! - [`listing::ListingRepository`] - Listings, images, catalog filters
//! - [`order::OrderRepository`] - Orders and status updates
//! - [`message::MessageRepository`] - Per-listing message threads
//! - [`comment::CommentRepository`] - Star-rated reviews
//! - [`traffic::TrafficRepository`] - Daily visit counters

pub mod comment;
pub mod listing;
pub mod message;
pub mod order;
pub mod traffic;
pub mod user;
