//! # Domain Types
//!
//! Core domain types used throughout Souk Market.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Listing      │   │     Order       │   │  User/Profile   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  seller_id      │   │  buyer_id       │   │  username       │       │
//! │  │  price_cents    │   │  amount_cents   │   │  role           │       │
//! │  │  is_active      │   │  status         │   │  phone          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │     Role        │   │  OrderStatus    │   │ Message / Comment   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  Buyer          │   │  Pending        │   │  listing-scoped     │   │
//! │  │  Seller         │   │  Confirmed      │   │  append-only        │   │
//! │  │  Admin          │   │  Cancelled      │   │                     │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `Order` copies the cart's price and the checkout contact fields at
//! checkout time. Later edits to the listing or the buyer's profile never
//! change what was ordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Role
// =============================================================================

/// The role attached to a marketplace profile.
///
/// ## Why an enum?
/// Every access-control decision matches on this exhaustively. A typo'd
/// role string cannot exist past the database boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May hold cart state and place orders.
    Buyer,
    /// May create/edit/delete own listings and confirm own orders.
    Seller,
    /// May view the admin dashboard (all orders + traffic).
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

// =============================================================================
// User & Profile
// =============================================================================

/// An authenticated identity.
///
/// Credentials only — the marketplace role lives on [`Profile`], which is a
/// separate row that can, in a broken dataset, be missing. That gap is an
/// explicit error condition, not a crash (see `CoreError::MissingProfile`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique login name.
    pub username: String,

    /// Contact address used for order notifications.
    pub email: String,

    /// Argon2 hash of the password. Never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Marketplace profile attached 1:1 to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Profile {
    /// Owning user id.
    pub user_id: String,

    /// Closed role variant; drives every access decision.
    pub role: Role,

    /// Optional contact phone, prefilled into the checkout form.
    pub phone: Option<String>,
}

// =============================================================================
// Listing
// =============================================================================

/// Category of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    Land,
    HouseSale,
    HouseRent,
}

/// Whether the listing is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Sale,
    Rent,
}

/// An item posted by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Listing {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The seller who owns this listing.
    pub seller_id: String,

    /// Display title.
    pub title: String,

    /// Free-form description.
    pub description: String,

    /// Price in minor units (never negative).
    pub price_cents: i64,

    /// Listing category.
    pub category: ListingCategory,

    /// Sale or rent.
    pub listing_type: ListingType,

    /// Soft-delete flag. Inactive listings never appear in catalog reads.
    pub is_active: bool,

    /// When the listing was created.
    pub created_at: DateTime<Utc>,

    /// When the listing was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Returns the live price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `user_id` owns this listing.
    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.seller_id == user_id
    }
}

/// An image attached to a listing. Lifecycle follows the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ListingImage {
    pub id: String,
    pub listing_id: String,
    /// Path under the media directory.
    pub path: String,
    /// Display order within the listing.
    pub position: i64,
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created at checkout, awaiting the seller.
    Pending,
    /// Accepted by the seller.
    Confirmed,
    /// Declared state with no reachable transition yet.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A buyer's committed intent to purchase a listing at a snapshotted price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub listing_id: String,

    /// Amount in minor units, frozen from the cart snapshot at checkout.
    /// NOT the live listing price.
    pub amount_cents: i64,

    // Delivery contact fields, captured at checkout time
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,

    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the frozen order amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Transitions the order to `Confirmed`.
    ///
    /// ## Rules
    /// Only a `Pending` order can be confirmed. Anything else is an
    /// `InvalidTransition` and leaves the status untouched.
    pub fn confirm(&mut self) -> CoreResult<()> {
        match self.status {
            OrderStatus::Pending => {
                self.status = OrderStatus::Confirmed;
                Ok(())
            }
            current => Err(CoreError::InvalidTransition {
                order_id: self.id.clone(),
                current,
            }),
        }
    }

    /// Transitions the order to `Cancelled`.
    ///
    /// The `Cancelled` state exists in the data model but no workflow
    /// reaches it yet; callers get an explicit marker instead of a silent
    /// no-op.
    pub fn cancel(&mut self) -> CoreResult<()> {
        Err(CoreError::TransitionNotImplemented {
            order_id: self.id.clone(),
        })
    }
}

// =============================================================================
// Checkout Contact Details
// =============================================================================

/// The delivery contact fields submitted with the checkout form.
///
/// `validated()` trims every field and enforces the charset/pattern rules;
/// the returned copy is what gets frozen onto the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,
}

impl ContactDetails {
    /// Validates and normalizes the contact fields.
    ///
    /// ## Rules
    /// - Names: letters, spaces and hyphens only, max 100 chars
    /// - Phone: optional leading `+`, then 8-10 digits
    /// - Neighborhood/city: required, max 100 chars
    pub fn validated(self) -> Result<ContactDetails, ValidationError> {
        Ok(ContactDetails {
            first_name: validation::validate_contact_name("first_name", &self.first_name)?,
            last_name: validation::validate_contact_name("last_name", &self.last_name)?,
            phone: validation::validate_phone(&self.phone)?,
            neighborhood: validation::validate_place("neighborhood", &self.neighborhood)?,
            city: validation::validate_place("city", &self.city)?,
        })
    }
}

// =============================================================================
// Message & Comment
// =============================================================================

/// A directed message between two users about one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Message {
    pub id: String,
    pub listing_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    /// Stored but never toggled by any current workflow.
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A star-rated review on a listing.
///
/// No uniqueness constraint: the same user may comment on the same listing
/// more than once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub content: String,
    /// Star rating, 1-5 inclusive.
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Site Traffic
// =============================================================================

/// Daily visit counters, one row per UTC calendar day.
///
/// Maintained by the session middleware and read by the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SiteTraffic {
    /// The UTC day this row counts.
    pub day: chrono::NaiveDate,
    /// Distinct new sessions seen that day.
    pub visitors: i64,
    /// Total requests seen that day.
    pub page_views: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_order() -> Order {
        Order {
            id: "o-1".to_string(),
            buyer_id: "u-buyer".to_string(),
            listing_id: "l-1".to_string(),
            amount_cents: 10_000,
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            phone: "+22512345678".to_string(),
            neighborhood: "Plateau".to_string(),
            city: "Abidjan".to_string(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_confirm_pending_order() {
        let mut order = pending_order();
        order.confirm().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_confirm_twice_is_invalid_and_keeps_status() {
        let mut order = pending_order();
        order.confirm().unwrap();

        let err = order.confirm().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                current: OrderStatus::Confirmed,
                ..
            }
        ));
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_cancel_is_explicitly_unimplemented() {
        let mut order = pending_order();
        let err = order.cancel().unwrap_err();
        assert!(matches!(err, CoreError::TransitionNotImplemented { .. }));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_contact_details_validated_trims() {
        let details = ContactDetails {
            first_name: " Awa ".to_string(),
            last_name: "Diop".to_string(),
            phone: " +22512345 ".to_string(),
            neighborhood: " Plateau ".to_string(),
            city: "Abidjan".to_string(),
        };

        let clean = details.validated().unwrap();
        assert_eq!(clean.first_name, "Awa");
        assert_eq!(clean.phone, "+22512345");
        assert_eq!(clean.neighborhood, "Plateau");
    }

    #[test]
    fn test_contact_details_rejects_bad_phone() {
        let details = ContactDetails {
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            phone: "not-a-phone".to_string(),
            neighborhood: "Plateau".to_string(),
            city: "Abidjan".to_string(),
        };
        assert!(details.validated().is_err());
    }
}
