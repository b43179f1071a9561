//! Checkout pricing.
//!
//! Fixed evaluation order: subtotal over the frozen draft, then coupon
//! discount, then shipping fee, then the zero-floored grand total. Every
//! stage is a pure function of the previous one; the breakdown is recomputed
//! whenever any input changes and never mutated in place.

use rust_decimal::Decimal;
use serde::Serialize;

use booknest_core::Price;

use crate::models::checkout::{CheckoutDraft, ShippingMethod};

/// The only coupon the storefront recognizes: 10% off the draft subtotal.
pub const COUPON_CODE: &str = "GIAM10";

/// Flat surcharge for express delivery.
pub const EXPRESS_SHIPPING_FEE: Price = Price::new(30_000);

/// 10% as a decimal fraction.
fn coupon_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Result of evaluating the coupon field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponOutcome {
    /// Field left empty; no discount, no message.
    NotEntered,
    /// Recognized code; carries the computed discount.
    Applied(Price),
    /// Unrecognized code. Not an error: discount resolves to zero with a
    /// neutral user-facing message.
    Unmatched,
}

impl CouponOutcome {
    /// The discount this outcome contributes.
    #[must_use]
    pub const fn discount(self) -> Price {
        match self {
            Self::Applied(discount) => discount,
            Self::NotEntered | Self::Unmatched => Price::ZERO,
        }
    }

    /// Message shown next to the coupon field, if any.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::NotEntered => None,
            Self::Applied(_) => Some("Đã áp dụng mã giảm giá."),
            Self::Unmatched => Some("Mã giảm giá không hợp lệ."),
        }
    }
}

/// Evaluate the coupon field against the draft subtotal.
///
/// The match is case-insensitive on the trimmed input; the recognized code
/// yields `round(subtotal * 10%)`, halves away from zero.
#[must_use]
pub fn evaluate_coupon(subtotal: Price, code: &str) -> CouponOutcome {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        CouponOutcome::NotEntered
    } else if trimmed.eq_ignore_ascii_case(COUPON_CODE) {
        CouponOutcome::Applied(subtotal.percent(coupon_rate()))
    } else {
        CouponOutcome::Unmatched
    }
}

/// Shipping fee for a method.
///
/// Zero until the address is complete; both methods are hidden in the UI
/// until then, so an incomplete address never carries a surcharge.
#[must_use]
pub const fn shipping_fee(method: ShippingMethod, address_complete: bool) -> Price {
    if !address_complete {
        return Price::ZERO;
    }
    match method {
        ShippingMethod::Standard => Price::ZERO,
        ShippingMethod::Express => EXPRESS_SHIPPING_FEE,
    }
}

/// The derived subtotal/discount/shipping/grand-total tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping_fee: Price,
    pub grand_total: Price,
}

impl PricingBreakdown {
    /// Compute the breakdown for the frozen draft and the current checkout
    /// inputs. Returns the coupon outcome alongside so the caller can render
    /// its message.
    #[must_use]
    pub fn compute(
        draft: &CheckoutDraft,
        coupon: &str,
        method: ShippingMethod,
        address_complete: bool,
    ) -> (Self, CouponOutcome) {
        let subtotal = draft.subtotal();
        let outcome = evaluate_coupon(subtotal, coupon);
        let discount = outcome.discount();
        let fee = shipping_fee(method, address_complete);
        let grand_total = subtotal
            .saturating_sub(discount)
            .saturating_add(fee)
            .floor_at_zero();

        (
            Self {
                subtotal,
                discount,
                shipping_fee: fee,
                grand_total,
            },
            outcome,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::cart::CartLine;
    use booknest_core::ProductId;

    fn draft(entries: &[(i64, u32)]) -> CheckoutDraft {
        CheckoutDraft {
            lines: entries
                .iter()
                .enumerate()
                .map(|(i, (price, quantity))| CartLine {
                    product_id: ProductId::new(format!("p{i}")),
                    title: format!("Book {i}"),
                    unit_price: Price::new(*price),
                    previous_unit_price: None,
                    image: String::new(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_reference_breakdown() {
        // [{price:100000, qty:2}, {price:50000, qty:1}], GIAM10, express,
        // complete address.
        let draft = draft(&[(100_000, 2), (50_000, 1)]);
        let (breakdown, outcome) =
            PricingBreakdown::compute(&draft, "GIAM10", ShippingMethod::Express, true);

        assert_eq!(breakdown.subtotal, Price::new(250_000));
        assert_eq!(breakdown.discount, Price::new(25_000));
        assert_eq!(breakdown.shipping_fee, Price::new(30_000));
        assert_eq!(breakdown.grand_total, Price::new(255_000));
        assert!(matches!(outcome, CouponOutcome::Applied(_)));
    }

    #[test]
    fn test_unmatched_coupon_is_silent_zero() {
        let draft = draft(&[(100_000, 1)]);
        let (breakdown, outcome) =
            PricingBreakdown::compute(&draft, "SALE50", ShippingMethod::Standard, true);

        assert_eq!(breakdown.discount, Price::ZERO);
        assert_eq!(breakdown.grand_total, Price::new(100_000));
        assert_eq!(outcome, CouponOutcome::Unmatched);
        assert!(outcome.message().is_some());
    }

    #[test]
    fn test_empty_coupon_has_no_message() {
        let outcome = evaluate_coupon(Price::new(100_000), "   ");
        assert_eq!(outcome, CouponOutcome::NotEntered);
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_coupon_is_case_insensitive() {
        let outcome = evaluate_coupon(Price::new(100_000), "giam10");
        assert_eq!(outcome, CouponOutcome::Applied(Price::new(10_000)));
    }

    #[test]
    fn test_shipping_gated_on_address_completeness() {
        assert_eq!(
            shipping_fee(ShippingMethod::Express, false),
            Price::ZERO,
            "incomplete address never carries a fee"
        );
        assert_eq!(shipping_fee(ShippingMethod::Express, true), EXPRESS_SHIPPING_FEE);
        assert_eq!(shipping_fee(ShippingMethod::Standard, true), Price::ZERO);
    }

    #[test]
    fn test_grand_total_floored_at_zero() {
        // A discount exceeding the subtotal clamps the total to zero.
        let draft = draft(&[(10, 1)]);
        let subtotal = draft.subtotal();
        let oversized = subtotal.saturating_add(Price::new(1_000));
        let grand_total = subtotal
            .saturating_sub(oversized)
            .saturating_add(Price::ZERO)
            .floor_at_zero();
        assert_eq!(grand_total, Price::ZERO);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let draft = draft(&[(100_000, 2), (50_000, 1)]);
        let first = PricingBreakdown::compute(&draft, "GIAM10", ShippingMethod::Express, true);
        let second = PricingBreakdown::compute(&draft, "GIAM10", ShippingMethod::Express, true);
        assert_eq!(first.0, second.0);
    }

    #[test]
    fn test_empty_draft_prices_to_zero() {
        let draft = CheckoutDraft::default();
        let (breakdown, _) =
            PricingBreakdown::compute(&draft, "GIAM10", ShippingMethod::Standard, false);
        assert_eq!(breakdown.subtotal, Price::ZERO);
        assert_eq!(breakdown.grand_total, Price::ZERO);
    }
}
