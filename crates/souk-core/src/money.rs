//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    A 10.99 price is stored as 1099                                      │
//! │    Listing prices, cart snapshots and order amounts all flow           │
//! │    through this type — the snapshot invariant (order amount ==         │
//! │    cart price at add time) is an i64 equality, never a float compare   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use souk_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Parse user input from a price form field
//! let parsed = Money::parse_decimal("10.99").unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use thiserror::Error;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values in arithmetic
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

/// Error produced when a decimal price string cannot be parsed.
///
/// Malformed price filters degrade gracefully at the HTTP boundary; this
/// error is what the degradation is built on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid non-negative decimal amount")]
pub struct ParseMoneyError;

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        Money(major * 100 + minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a non-negative decimal string ("1500", "10.99", "7.5")
    /// into a Money value.
    ///
    /// ## Rules
    /// - Leading/trailing whitespace is ignored
    /// - At most one decimal point, with 1 or 2 fraction digits
    /// - No sign characters: prices and price filters are never negative
    /// - Everything else is a `ParseMoneyError`
    ///
    /// ## Example
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("10.99").unwrap().cents(), 1099);
    /// assert_eq!(Money::parse_decimal("7.5").unwrap().cents(), 750);
    /// assert_eq!(Money::parse_decimal("1500").unwrap().cents(), 150_000);
    /// assert!(Money::parse_decimal("-3").is_err());
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, ParseMoneyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseMoneyError);
        }

        let (major_str, minor_str) = match input.split_once('.') {
            // A trailing dot ("3.") is not a valid amount
            Some((_, "")) => return Err(ParseMoneyError),
            Some((major, minor)) => (major, minor),
            None => (input, ""),
        };

        if major_str.is_empty() || !major_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseMoneyError);
        }

        let major: i64 = major_str.parse().map_err(|_| ParseMoneyError)?;

        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 | 2 => {
                if !minor_str.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseMoneyError);
                }
                let raw: i64 = minor_str.parse().map_err(|_| ParseMoneyError)?;
                // "7.5" means 7.50, not 7.05
                if minor_str.len() == 1 {
                    raw * 10
                } else {
                    raw
                }
            }
            _ => return Err(ParseMoneyError),
        };

        major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .map(Money)
            .ok_or(ParseMoneyError)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs, emails and debugging. Currency symbols and
/// localization belong to the rendering layer, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
