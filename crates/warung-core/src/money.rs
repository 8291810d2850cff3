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
//! │  OUR SOLUTION: Integer smallest units                                   │
//! │    Prices, subtotals and revenue are whole rupiah (i64).                │
//! │    Line totals, sale totals and report totals use checked arithmetic;   │
//! │    there is no unchecked `+` on Money.                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//!
//! let price = Money::from_units(12_500);
//! let line = price.checked_line_total(3).unwrap();
//! assert_eq!(line.units(), 37_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: matches SQLite INTEGER, no conversions at the store boundary
/// - **Transparent serde**: serializes as a bare JSON number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► SaleItem.unit_price ──► SaleItem.subtotal           │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │                                         Sale.total_amount               │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │                                     Summary.total_revenue               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from smallest currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in smallest currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
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

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_units(3_000);
    /// assert_eq!(unit_price.checked_line_total(4).unwrap().units(), 12_000);
    /// assert!(Money::from_units(i64::MAX).checked_line_total(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_line_total(&self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Sums amounts, returning `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Rupiah-style display with `.` thousands separators, e.g. `Rp 35.000`.
///
/// For logs and error messages only; clients do their own formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(units)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(35_000).to_string(), "Rp 35.000");
        assert_eq!(Money::from_units(500).to_string(), "Rp 500");
        assert_eq!(Money::from_units(1_234_567).to_string(), "Rp 1.234.567");
        assert_eq!(Money::from_units(-7_000).to_string(), "-Rp 7.000");
        assert_eq!(Money::zero().to_string(), "Rp 0");
    }

    #[test]
    fn test_sum() {
        let total = [10_000, 20_000, 5_000]
            .into_iter()
            .map(Money::from_units);
        assert_eq!(Money::checked_sum(total).unwrap().units(), 35_000);
        assert_eq!(
            Money::checked_sum([Money::from_units(i64::MAX), Money::from_units(1)]),
            None
        );
    }

    #[test]
    fn test_checked_line_total_overflow() {
        assert_eq!(
            Money::from_units(2_500).checked_line_total(2),
            Some(Money::from_units(5_000))
        );
        assert_eq!(Money::from_units(i64::MAX / 2 + 1).checked_line_total(2), None);
        assert_eq!(Money::from_units(i64::MAX).checked_add(Money::from_units(1)), None);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_units(12_000)).unwrap();
        assert_eq!(json, "12000");
    }
}
