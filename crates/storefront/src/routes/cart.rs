//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session: the line list under a durable key,
//! the checkout selection under a session-scoped key. Handlers hydrate the
//! store, apply one mutation, and persist both keys back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use booknest_core::{Price, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::models::cart::{CartStore, ProductInput};
use crate::models::checkout::CheckoutDraft;
use crate::models::session_keys;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub previous_unit_price: Option<Price>,
    pub line_total: Price,
    pub selected: bool,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: Price,
    pub count: u32,
    pub all_selected: bool,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product_id.as_str().to_string(),
                    title: line.title.clone(),
                    image: line.image.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    previous_unit_price: line.previous_unit_price,
                    line_total: line.line_total(),
                    selected: cart.is_selected(&line.product_id),
                })
                .collect(),
            subtotal: cart.subtotal(),
            count: cart.count(),
            all_selected: cart.all_selected(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Hydrate the cart from the session. Absent or malformed storage yields an
/// empty cart rather than an error.
pub async fn load_cart(session: &Session) -> CartStore {
    let lines = session
        .get::<String>(session_keys::CART_LINES)
        .await
        .ok()
        .flatten();
    let selection = session
        .get::<String>(session_keys::CART_SELECTION)
        .await
        .ok()
        .flatten();

    CartStore::hydrate(lines.as_deref(), selection.as_deref())
}

/// Persist the cart back to the session. Storage failures are logged and
/// swallowed; the in-memory response still reflects the mutation.
pub async fn save_cart(session: &Session, cart: &CartStore) {
    if let Err(e) = session
        .insert(session_keys::CART_LINES, cart.serialize_lines())
        .await
    {
        tracing::warn!("Failed to persist cart lines: {e}");
    }
    if let Err(e) = session
        .insert(session_keys::CART_SELECTION, cart.serialize_selection())
        .await
    {
        tracing::warn!("Failed to persist cart selection: {e}");
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart payload: the product shape as the catalog serves it, plus an
/// optional quantity.
#[derive(Debug, Deserialize)]
pub struct AddToCartPayload {
    #[serde(flatten)]
    pub product: ProductInput,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Single-line form data (remove, select toggle).
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Render the items fragment with the cart-updated trigger attached.
fn items_fragment(cart: &CartStore) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add item to cart (HTMX).
///
/// Accepts the loose catalog product shape, normalizes it to a cart line, and
/// merges by product identity. Returns the count badge fragment with a
/// trigger so other fragments refresh.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the payload carries no usable product
/// identity. Adding a well-formed product cannot fail.
#[instrument(skip(session, payload))]
pub async fn add(
    session: Session,
    Json(payload): Json<AddToCartPayload>,
) -> Result<Response, AppError> {
    let quantity = payload.quantity.unwrap_or(1);
    let line = payload.product.into_line(quantity).map_err(|e| {
        tracing::warn!("Rejected add-to-cart payload: {e}");
        AppError::BadRequest("product is missing an identity field".to_string())
    })?;

    let mut cart = load_cart(&session).await;
    cart.add(line);
    save_cart(&session, &cart).await;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count: cart.count() },
    )
        .into_response())
}

/// Update cart line quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(&ProductId::new(form.product_id), form.quantity);
    save_cart(&session, &cart).await;
    items_fragment(&cart)
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartLineForm>) -> Response {
    let mut cart = load_cart(&session).await;
    cart.remove(&ProductId::new(form.product_id));
    save_cart(&session, &cart).await;
    items_fragment(&cart)
}

/// Toggle a line's checkout tick (HTMX).
#[instrument(skip(session))]
pub async fn select(session: Session, Form(form): Form<CartLineForm>) -> Response {
    let mut cart = load_cart(&session).await;
    cart.toggle_select(&ProductId::new(form.product_id));
    save_cart(&session, &cart).await;
    items_fragment(&cart)
}

/// Select-all toggle (HTMX).
#[instrument(skip(session))]
pub async fn select_all(session: Session) -> Response {
    let mut cart = load_cart(&session).await;
    cart.select_all();
    save_cart(&session, &cart).await;
    items_fragment(&cart)
}

/// Remove every ticked line (HTMX).
#[instrument(skip(session))]
pub async fn remove_selected(session: Session) -> Response {
    let mut cart = load_cart(&session).await;
    cart.remove_selected();
    save_cart(&session, &cart).await;
    items_fragment(&cart)
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartCountTemplate { count: cart.count() }
}

/// Freeze the checkout draft and hand off to the checkout screen.
///
/// The draft is the ticked selection, or the whole cart when nothing is
/// ticked. An empty cart bounces back to the cart page.
#[instrument(skip(session))]
pub async fn checkout(session: Session) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let draft = CheckoutDraft::from_cart(&cart);
    if let Err(e) = session
        .insert(session_keys::CHECKOUT_DRAFT, draft.serialize())
        .await
    {
        tracing::error!("Failed to persist checkout draft: {e}");
        return Redirect::to("/cart").into_response();
    }

    Redirect::to("/checkout").into_response()
}
