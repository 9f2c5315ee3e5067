//! # Session Cart
//!
//! Single-slot cart with price snapshots.
//!
//! ## Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart → Order Snapshot Flow                          │
//! │                                                                         │
//! │   Listing (live)          Cart (session)           Order (durable)     │
//! │   ┌─────────────┐   add   ┌─────────────┐ checkout ┌─────────────┐     │
//! │   │ price: 1099 │ ──────► │ price: 1099 │ ───────► │amount: 1099 │     │
//! │   └─────────────┘         └─────────────┘          └─────────────┘     │
//! │         │                        │                        │            │
//! │   seller edits             UNCHANGED                UNCHANGED          │
//! │   price: 1299                                                          │
//! │                                                                         │
//! │   The price is copied ONCE, at add time. The buyer pays what they      │
//! │   saw, not what the listing says later.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single Slot
//! The cart holds at most one entry. Adding while full REPLACES the entry;
//! there is no quantity, no line-item list, no merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ContactDetails, Listing, ListingImage, Order, OrderStatus, Profile, Role};

// =============================================================================
// Cart Entry
// =============================================================================

/// A snapshot of one listing, frozen at add-to-cart time.
///
/// Holds copies, not references: the cart stays renderable even if the
/// listing is edited or deactivated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The listing this snapshot was taken from.
    pub listing_id: String,

    /// Title as it read at add time.
    pub title: String,

    /// Price in minor units at add time. This, not the live price,
    /// becomes the order amount.
    pub price_cents: i64,

    /// First image of the listing at add time, if any.
    pub image_path: Option<String>,

    /// When the snapshot was taken.
    pub added_at: DateTime<Utc>,
}

impl CartEntry {
    /// Takes a snapshot of a listing.
    pub fn from_listing(listing: &Listing, first_image: Option<&ListingImage>) -> Self {
        CartEntry {
            listing_id: listing.id.clone(),
            title: listing.title.clone(),
            price_cents: listing.price_cents,
            image_path: first_image.map(|img| img.path.clone()),
            added_at: Utc::now(),
        }
    }

    /// The snapshotted price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The session cart: zero or one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entry: Option<CartEntry>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { entry: None }
    }

    /// Puts an entry in the cart, replacing whatever was there.
    pub fn add(&mut self, entry: CartEntry) {
        self.entry = Some(entry);
    }

    /// Empties the cart. Idempotent: clearing an empty cart succeeds.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// The current entry, if any.
    pub fn entry(&self) -> Option<&CartEntry> {
        self.entry.as_ref()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

// =============================================================================
// Cart Operations
// =============================================================================

/// Adds a listing to the cart, enforcing the buyer-side guards.
///
/// ## Guards (all-or-nothing)
/// - actor must hold the buyer role
/// - listing must be active
/// - actor must not be the listing's own seller
///
/// If any guard fails the cart is left untouched.
pub fn add_to_cart(
    cart: &mut Cart,
    actor_id: &str,
    profile: Option<&Profile>,
    listing: &Listing,
    first_image: Option<&ListingImage>,
) -> CoreResult<()> {
    crate::access::require_role(actor_id, profile, Role::Buyer)?;

    if !listing.is_active {
        return Err(CoreError::ListingNotFound(listing.id.clone()));
    }
    if listing.is_owned_by(actor_id) {
        return Err(CoreError::OwnListing {
            listing_id: listing.id.clone(),
        });
    }

    cart.add(CartEntry::from_listing(listing, first_image));
    Ok(())
}

/// Builds the order from the cart snapshot and validated contact details.
///
/// ## Invariants
/// - the amount comes from the CART snapshot, never the live listing
/// - the returned order is always `Pending`
/// - the cart itself is not cleared here; the caller clears it only after
///   the order has been durably stored
pub fn checkout(
    cart: &Cart,
    buyer_id: &str,
    profile: Option<&Profile>,
    contact: ContactDetails,
) -> CoreResult<Order> {
    crate::access::require_role(buyer_id, profile, Role::Buyer)?;

    let entry = cart.entry().ok_or(CoreError::EmptyCart)?;
    let contact = contact.validated()?;

    Ok(Order {
        id: Uuid::new_v4().to_string(),
        buyer_id: buyer_id.to_string(),
        listing_id: entry.listing_id.clone(),
        amount_cents: entry.price_cents,
        first_name: contact.first_name,
        last_name: contact.last_name,
        phone: contact.phone,
        neighborhood: contact.neighborhood,
        city: contact.city,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
