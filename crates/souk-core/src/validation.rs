//! # Field Validation
//!
//! Validation rules for user-submitted fields.
//!
//! Every function trims its input and returns the normalized value on
//! success, so callers store exactly what passed validation. Field names
//! travel inside the error, which is what the HTTP layer flashes back.
//!
//! ## The Rules at a Glance
//! ```text
//! ┌──────────────────┬─────────────────────────────────────────────────────┐
//! │ Field            │ Rule                                                │
//! ├──────────────────┼─────────────────────────────────────────────────────┤
//! │ title            │ non-empty, ≤ 200 chars                              │
//! │ description      │ non-empty                                           │
//! │ message/comment  │ ≥ 5 chars after trim                                │
//! │ rating           │ integer 1..=5                                       │
//! │ contact names    │ letters, spaces, hyphens; ≤ 100 chars               │
//! │ phone            │ optional '+', then 8-10 ASCII digits                │
//! │ neighborhood/city│ non-empty, ≤ 100 chars                              │
//! │ price            │ non-negative decimal, ≤ 2 fraction digits          │
//! └──────────────────┴─────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::{MAX_CONTACT_CHARS, MAX_PHONE_CHARS, MAX_RATING, MAX_TITLE_CHARS, MIN_CONTENT_CHARS, MIN_RATING};

// =============================================================================
// Listing Fields
// =============================================================================

/// Validates a listing title: required, bounded length.
pub fn validate_title(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "title" });
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a listing description: required, unbounded.
pub fn validate_description(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "description",
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a price in minor units: never negative.
pub fn validate_price_cents(cents: i64) -> ValidationResult<i64> {
    if cents < 0 {
        return Err(ValidationError::InvalidFormat {
            field: "price",
            reason: "must not be negative",
        });
    }
    Ok(cents)
}

/// Parses a price form field into Money.
///
/// The field name is a parameter because the same rule applies to the
/// listing price field and to the catalog's min/max price filters.
pub fn parse_price_input(field: &'static str, input: &str) -> ValidationResult<Money> {
    Money::parse_decimal(input).map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "must be a non-negative amount like 1500 or 10.99",
    })
}

// =============================================================================
// Engagement Fields
// =============================================================================

/// Validates message and comment content: at least 5 chars after trimming.
pub fn validate_content(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "content" });
    }
    if trimmed.chars().count() < MIN_CONTENT_CHARS {
        return Err(ValidationError::TooShort {
            field: "content",
            min: MIN_CONTENT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a star rating: integer in 1..=5.
pub fn validate_rating(rating: i64) -> ValidationResult<i64> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating",
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }
    Ok(rating)
}

// =============================================================================
// Checkout Contact Fields
// =============================================================================

/// Validates a contact name: letters, spaces and hyphens only.
///
/// Digits and punctuation in a delivery name are a data-entry mistake;
/// rejecting them here keeps order snapshots printable.
pub fn validate_contact_name(field: &'static str, input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if trimmed.chars().count() > MAX_CONTACT_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_CONTACT_CHARS,
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "only letters, spaces and hyphens are allowed",
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a phone number: optional leading `+`, then 8-10 digits.
pub fn validate_phone(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "phone" });
    }
    if trimmed.chars().count() > MAX_PHONE_CHARS {
        return Err(ValidationError::TooLong {
            field: "phone",
            max: MAX_PHONE_CHARS,
        });
    }

    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digit_count = digits.len();
    if digit_count < 8 || digit_count > 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone",
            reason: "expected an optional + followed by 8 to 10 digits",
        });
    }
    Ok(trimmed.to_string())
}

/// Validates a neighborhood or city name: required, bounded length.
pub fn validate_place(field: &'static str, input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if trimmed.chars().count() > MAX_CONTACT_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_CONTACT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
