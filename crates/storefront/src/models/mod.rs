//! Domain models for the storefront.

pub mod cart;
pub mod checkout;
pub mod session;

pub use cart::{CartLine, CartStore, ProductInput, ProductShapeError};
pub use checkout::{CheckoutDraft, PaymentMethod, PaymentStatus, ShippingMethod};
pub use session::keys as session_keys;
