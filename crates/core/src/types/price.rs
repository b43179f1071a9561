//! Type-safe price representation in Vietnamese đồng.
//!
//! Catalog prices are whole-đồng integers (the currency has no minor unit in
//! practice), so `Price` wraps an `i64` amount. Percentage math (coupon
//! discounts) goes through `rust_decimal` to get exact midpoint rounding.

use core::fmt;
use core::iter::Sum;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in whole Vietnamese đồng.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(0);

    /// Create a new price from a đồng amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the amount in đồng.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, saturating at `i64::MAX`.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Take a percentage of this price, rounding halves away from zero.
    ///
    /// `rate` is a fraction, e.g. `Decimal::new(10, 2)` for 10%.
    #[must_use]
    pub fn percent(self, rate: Decimal) -> Self {
        let exact = Decimal::from(self.0) * rate;
        let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(rounded.to_i64().unwrap_or(0))
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub const fn floor_at_zero(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Whether this price is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Price {
    /// Formats with dot thousand separators and the đồng sign: `250.000₫`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if negative {
            write!(f, "-{grouped}₫")
        } else {
            write!(f, "{grouped}₫")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ten_percent() -> Decimal {
        Decimal::new(10, 2)
    }

    #[test]
    fn test_times_and_sum() {
        let subtotal: Price = [Price::new(100_000).times(2), Price::new(50_000).times(1)]
            .into_iter()
            .sum();
        assert_eq!(subtotal, Price::new(250_000));
    }

    #[test]
    fn test_percent_rounds_midpoint_away_from_zero() {
        assert_eq!(Price::new(250_000).percent(ten_percent()), Price::new(25_000));
        // 10% of 15 = 1.5 -> rounds to 2, not 1
        assert_eq!(Price::new(15).percent(ten_percent()), Price::new(2));
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Price::new(-500).floor_at_zero(), Price::ZERO);
        assert_eq!(Price::new(500).floor_at_zero(), Price::new(500));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(255_000).to_string(), "255.000₫");
        assert_eq!(Price::new(1_250_000).to_string(), "1.250.000₫");
        assert_eq!(Price::new(999).to_string(), "999₫");
        assert_eq!(Price::ZERO.to_string(), "0₫");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Price::new(30_000)).unwrap();
        assert_eq!(json, "30000");
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Price::new(30_000));
    }
}
