//! Remote collaborators consumed over REST.
//!
//! - [`address`] - public province/district/ward data source (read-only)
//! - [`orders`] - order-creation backend
//! - [`payment`] - payment-redirect URL backend

pub mod address;
pub mod orders;
pub mod payment;

pub use address::{AddressClient, AddressError, AdminUnit, ProvinceDirectory};
pub use orders::{OrderApiError, OrderPayload, OrdersClient};
pub use payment::{PaymentClient, PaymentError};
