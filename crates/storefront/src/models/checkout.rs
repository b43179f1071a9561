//! Checkout draft and method types.
//!
//! The draft is the frozen snapshot of lines being purchased: it is written
//! once when the shopper leaves the cart for checkout and read back by the
//! checkout screen, so later cart edits never alter an in-progress checkout.

use serde::{Deserialize, Serialize};

use booknest_core::Price;

use crate::models::cart::{CartLine, CartStore};

/// The frozen set of lines for the current checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub lines: Vec<CartLine>,
}

impl CheckoutDraft {
    /// Freeze the draft from the cart: the ticked selection, or the whole
    /// cart when nothing is ticked.
    #[must_use]
    pub fn from_cart(cart: &CartStore) -> Self {
        Self {
            lines: cart.checkout_lines(),
        }
    }

    /// Rebuild from the session-scoped handoff. Absent or malformed content
    /// yields an empty draft; the checkout screen then blocks submission.
    #[must_use]
    pub fn hydrate(raw: Option<&str>) -> Self {
        raw.and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    /// Serialize for the session-scoped handoff.
    #[must_use]
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Checkout subtotal over the draft lines only.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Shipping method choice.
///
/// Defaults to standard: the method radios are hidden until the shipping
/// address is complete, so early pricing requests carry no method field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

/// Payment method choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// VNPay gateway redirect.
    Vnpay,
}

impl PaymentMethod {
    /// Initial payment status attached to the created order.
    #[must_use]
    pub const fn initial_status(self) -> PaymentStatus {
        match self {
            Self::Cod => PaymentStatus::Unpaid,
            Self::Vnpay => PaymentStatus::Pending,
        }
    }

    /// Whether this method hands the shopper to an off-site gateway.
    #[must_use]
    pub const fn requires_redirect(self) -> bool {
        matches!(self, Self::Vnpay)
    }
}

/// Payment status as understood by the order backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
}
