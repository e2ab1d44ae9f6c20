//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Every price, cost, saldo and abono is an i64 number of centavos.     │
//! │    The backend contract carries centavos too, so nothing is lost in     │
//! │    transit. Only the terminal display converts to pesos.                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tienda_core::money::Money;
//!
//! let precio = Money::from_centavos(1250); // $12.50
//! let total = precio * 3;
//! assert_eq!(total.centavos(), 3750);
//! assert_eq!(total.to_string(), "$37.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::CoreError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: saldo adjustments and corrections can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a bare integer, matching the
///   backend JSON contract
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Checks whether the amount is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checks whether the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parses a user-typed decimal string into Money.
    ///
    /// Accepts `"12"`, `"12.5"`, `"12.50"`. Rejects more than two decimal
    /// places, embedded signs beyond a leading `-`, and anything non-numeric.
    /// This is the only place user text becomes money; forms never do float
    /// arithmetic.
    ///
    /// ## Example
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.50").unwrap().centavos(), 1250);
    /// assert_eq!(Money::parse("7").unwrap().centavos(), 700);
    /// assert!(Money::parse("12.505").is_err());
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let s = input.trim();
        let invalid = || CoreError::MontoInvalido(input.to_string());

        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        if s.is_empty() {
            return Err(invalid());
        }

        let (entero, decimal) = match s.split_once('.') {
            Some((e, d)) => (e, d),
            None => (s, ""),
        };

        if entero.is_empty() && decimal.is_empty() {
            return Err(invalid());
        }
        if decimal.len() > 2 {
            return Err(invalid());
        }
        if !entero.chars().all(|c| c.is_ascii_digit())
            || !decimal.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let pesos: i64 = if entero.is_empty() {
            0
        } else {
            entero.parse().map_err(|_| invalid())?
        };
        // "12.5" means 50 centavos, not 5
        let centavos: i64 = match decimal.len() {
            0 => 0,
            1 => decimal.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => decimal.parse().map_err(|_| invalid())?,
        };

        let total = pesos
            .checked_mul(100)
            .and_then(|p| p.checked_add(centavos))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

// =============================================================================
// Arithmetic Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for Money {
    /// Formats as `$12.34` (or `-$12.34` for negative amounts).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
