//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  Sale totals are sums of quantity × unit price, minus a discount.      │
//! │  Summing floats across a month of sales drifts.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer centavos                                         │
//! │    ₱499.00 is stored as 49900                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(49_900);      // ₱499.00
//! let doubled = price * 2;                     // ₱998.00
//! let total = doubled - Money::from_cents(8_000); // ₱918.00 after discount
//! assert_eq!(total.cents(), 91_800);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Where Money is Used
/// ```text
/// InventoryItem.price_cents ──► SaleLineRequest.unit_price_cents
///                                      │
///                                      ▼  × quantity
///                              SaleLineItem.line_total_cents
///                                      │
///                                      ▼  Σ lines − discount
///                              Sale.total_cents ──► SalesSummary.revenue
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos and centavos.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let line_total = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`multiply_quantity`](Self::multiply_quantity), but `None` on
    /// overflow.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Addition that returns `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Integer average over `count` entries, truncating toward zero.
    ///
    /// Returns zero when `count` is zero instead of dividing by it.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).average_over(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).average_over(0).cents(), 0);
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Frontends do their own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(49_900)), "₱499.00");
        assert_eq!(format!("{}", Money::from_cents(5)), "₱0.05");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₱5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert!((b - a).is_negative());
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(300), Money::from_cents(450)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.cents(), 750);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_average_truncates_and_handles_zero_count() {
        assert_eq!(Money::from_cents(999).average_over(2).cents(), 499);
        assert_eq!(Money::from_cents(999).average_over(0), Money::zero());
    }
}
