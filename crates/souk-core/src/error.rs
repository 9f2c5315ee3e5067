//! # Error Types
//!
//! Domain errors for Souk Market business logic.
//!
//! ## Error Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Handling Strategy                           │
//! │                                                                         │
//! │   souk-core errors are:                                                 │
//! │   • TYPED       - Each failure mode is a distinct variant               │
//! │   • ACTIONABLE  - Callers can match and respond appropriately           │
//! │   • HONEST      - No silent fallbacks, no panics                        │
//! │                                                                         │
//! │   The HTTP layer maps each variant onto a user outcome:                 │
//! │   • AccessDenied / NotOwner   →  redirect with a flash message          │
//! │   • Validation(_)             →  re-render the form with the reason     │
//! │   • *NotFound                 →  404                                    │
//! │   • MissingProfile            →  500 (data integrity gap, logged)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{OrderStatus, Role};

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Core Errors
// =============================================================================

/// Errors that can occur in business logic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The referenced listing does not exist or is not visible.
    #[error("listing not found: {0}")]
    ListingNotFound(String),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// The actor's role does not permit this operation.
    #[error("access denied: requires {required} role")]
    AccessDenied {
        /// The role the operation requires.
        required: Role,
    },

    /// A user row exists but its profile row is missing.
    ///
    /// This is a data integrity gap, not a user mistake. It is surfaced
    /// explicitly so the HTTP layer can log it and fail loudly.
    #[error("user {user_id} has no profile")]
    MissingProfile { user_id: String },

    /// A seller attempted to act as a buyer on their own listing.
    #[error("cannot add own listing {listing_id} to cart")]
    OwnListing { listing_id: String },

    /// The actor does not own the listing or order they tried to mutate.
    #[error("not the owner of {listing_id}")]
    NotOwner { listing_id: String },

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The order status does not allow the requested transition.
    #[error("order {order_id} cannot transition from {current}")]
    InvalidTransition {
        order_id: String,
        current: OrderStatus,
    },

    /// The transition exists in the data model but no workflow reaches it.
    #[error("no workflow reaches this transition for order {order_id}")]
    TransitionNotImplemented { order_id: String },

    /// A submitted field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field validation failure.
///
/// Carries the field name so the HTTP layer can flash a precise message
/// without the handler re-deriving which input was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The field was empty after trimming.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// The field was shorter than the minimum length.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// The field exceeded the maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// A numeric field was outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// The field did not match its expected format.
    #[error("{field} is invalid: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = CoreError::AccessDenied {
            required: Role::Seller,
        };
        assert_eq!(err.to_string(), "access denied: requires seller role");

        let err = CoreError::InvalidTransition {
            order_id: "o-1".to_string(),
            current: OrderStatus::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "order o-1 cannot transition from confirmed"
        );
    }

    #[test]
    fn test_validation_error_converts_to_core_error() {
        let validation = ValidationError::TooShort {
            field: "content",
            min: 5,
        };
        let core: CoreError = validation.clone().into();
        assert_eq!(core, CoreError::Validation(validation));
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let err = ValidationError::Required { field: "city" };
        assert_eq!(err.to_string(), "city is required");

        let err = ValidationError::OutOfRange {
            field: "rating",
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "rating must be between 1 and 5");
    }
}
