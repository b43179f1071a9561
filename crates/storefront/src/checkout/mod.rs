//! Checkout domain logic: the address cascade, the pricing engine, and the
//! submission gate. Everything here is pure or directory-driven; the HTTP
//! handlers in `routes::checkout` are thin adapters over this module.

pub mod cascade;
pub mod pricing;
pub mod validation;

pub use cascade::{AddressCascade, LevelState};
pub use pricing::{COUPON_CODE, CouponOutcome, EXPRESS_SHIPPING_FEE, PricingBreakdown};
pub use validation::{CheckoutForm, FieldErrors, ValidContact, validate};
