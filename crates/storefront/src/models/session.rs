//! Session-related types.
//!
//! The session store doubles as the two client-side storage tiers of the
//! original storefront: the durable cart line list and the session-scoped
//! checkout draft handoff. Everything is stored as serialized strings so a
//! malformed value degrades to an empty cart/draft instead of an error.

/// Session keys for cart and checkout state.
pub mod keys {
    /// Durable serialized cart line list.
    pub const CART_LINES: &str = "cart_lines";

    /// Session-scoped checkout selection (ticked product ids).
    pub const CART_SELECTION: &str = "cart_selection";

    /// Session-scoped frozen checkout draft.
    pub const CHECKOUT_DRAFT: &str = "checkout_draft";
}
