//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to the cart page
//! GET  /health                  - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add to cart (count fragment, triggers cart-updated)
//! POST /cart/update             - Update quantity (cart_items fragment)
//! POST /cart/remove             - Remove line (cart_items fragment)
//! POST /cart/select             - Toggle a line's checkout tick (cart_items fragment)
//! POST /cart/select-all         - Select-all toggle (cart_items fragment)
//! POST /cart/remove-selected    - Remove all ticked lines (cart_items fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//! POST /cart/checkout           - Freeze the checkout draft, redirect to /checkout
//!
//! # Checkout
//! GET  /checkout                - Checkout page over the frozen draft
//! POST /checkout                - Validate and submit the order
//! GET  /checkout/districts      - District options for a province (fragment)
//! GET  /checkout/wards          - Ward options for a district (fragment)
//! POST /checkout/price          - Recompute the pricing panel (fragment)
//! GET  /checkout/success        - Order confirmation page
//! ```

pub mod cart;
pub mod checkout;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/select", post(cart::select))
        .route("/select-all", post(cart::select_all))
        .route("/remove-selected", post(cart::remove_selected))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/districts", get(checkout::districts))
        .route("/wards", get(checkout::wards))
        .route("/price", post(checkout::price))
        .route("/success", get(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/cart") }))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
