//! # souk-core: Pure Business Logic for Souk Market
//!
//! This crate is the **heart** of Souk Market. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Souk Market Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Surface (axum)                          │   │
//! │  │   listings ──► cart ──► checkout ──► dashboards ──► messages   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ souk-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  access   │  │   │
//! │  │   │  Listing  │  │   Money   │  │   Cart    │  │   Role    │  │   │
//! │  │   │   Order   │  │  parsing  │  │ CartEntry │  │   gates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    souk-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Listing, Order, Message, Comment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Single-slot session cart with price snapshots
//! - [`access`] - Role-based access control decisions
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64), no floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Closed Roles**: Buyer/Seller/Admin are an enum, matched exhaustively

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use souk_core::Money` instead of
// `use souk_core::money::Money`

pub use cart::{Cart, CartEntry};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length (after trimming) for message and comment content.
///
/// ## Business Reason
/// Filters out empty-ish submissions ("ok", ".") without being a real
/// moderation layer.
pub const MIN_CONTENT_CHARS: usize = 5;

/// Maximum length for a listing title.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum length for checkout contact names, neighborhoods and cities.
pub const MAX_CONTACT_CHARS: usize = 100;

/// Maximum length for a phone number as entered.
pub const MAX_PHONE_CHARS: usize = 20;

/// Comment ratings are star values in this inclusive range.
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Maximum accepted size of one uploaded listing image.
///
/// ## Business Reason
/// Keeps the media directory bounded; large originals belong on a CDN,
/// not in a marketplace upload form.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
