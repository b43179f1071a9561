//! Checkout route handlers.
//!
//! The checkout screen works over the frozen draft, never the live cart.
//! Address selects and the pricing panel are HTMX fragments; the final
//! submission validates, resolves address codes to names against the
//! directory, and delegates to the order backend. Any submission failure
//! re-renders the page with all state intact so the shopper can retry.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use booknest_core::Price;

use crate::checkout::cascade::{AddressCascade, LevelState};
use crate::checkout::pricing::{COUPON_CODE, CouponOutcome, PricingBreakdown};
use crate::checkout::validation::{self, CheckoutForm, FieldErrors};
use crate::filters;
use crate::models::checkout::{CheckoutDraft, ShippingMethod};
use crate::models::session_keys;
use crate::services::address::{AdminUnit, ProvinceDirectory};
use crate::services::orders::{CouponApplied, OrderItem, OrderPayload, ShippingAddress};
use crate::state::AppState;

/// Draft line display data for templates.
#[derive(Clone)]
pub struct DraftLineView {
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Frozen draft display data for templates.
#[derive(Clone)]
pub struct DraftView {
    pub items: Vec<DraftLineView>,
    pub subtotal: Price,
}

impl From<&CheckoutDraft> for DraftView {
    fn from(draft: &CheckoutDraft) -> Self {
        Self {
            items: draft
                .lines
                .iter()
                .map(|line| DraftLineView {
                    title: line.title.clone(),
                    image: line.image.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
            subtotal: draft.subtotal(),
        }
    }
}

/// Pricing panel display data for templates.
#[derive(Clone)]
pub struct PricingView {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping_fee: Price,
    pub grand_total: Price,
    pub coupon_message: Option<&'static str>,
    pub coupon_applied: bool,
}

impl PricingView {
    fn new(breakdown: PricingBreakdown, outcome: CouponOutcome) -> Self {
        Self {
            subtotal: breakdown.subtotal,
            discount: breakdown.discount,
            shipping_fee: breakdown.shipping_fee,
            grand_total: breakdown.grand_total,
            coupon_message: outcome.message(),
            coupon_applied: matches!(outcome, CouponOutcome::Applied(_)),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub draft: DraftView,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    pub provinces: LevelState,
    pub districts: LevelState,
    pub wards: LevelState,
    pub pricing: PricingView,
    pub banner: Option<String>,
    pub address_complete: bool,
    pub express: bool,
}

/// Address `<option>` list fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_options.html")]
pub struct AddressOptionsTemplate {
    pub level: LevelState,
    pub placeholder: &'static str,
}

/// Pricing recompute fragment template (for HTMX): the pricing panel plus an
/// out-of-band swap of the shipping-method block, which appears once the
/// address is complete.
#[derive(Template, WebTemplate)]
#[template(path = "partials/pricing_sync.html")]
pub struct PricingSyncTemplate {
    pub pricing: PricingView,
    pub address_complete: bool,
    pub express: bool,
}

/// Order success page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub order_id: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Hydrate the frozen draft from the session.
async fn load_draft(session: &Session) -> CheckoutDraft {
    let raw = session
        .get::<String>(session_keys::CHECKOUT_DRAFT)
        .await
        .ok()
        .flatten();
    CheckoutDraft::hydrate(raw.as_deref())
}

/// Drop cart and checkout state after a completed cash-on-delivery order.
async fn clear_checkout_state(session: &Session) {
    for key in [
        session_keys::CART_LINES,
        session_keys::CART_SELECTION,
        session_keys::CHECKOUT_DRAFT,
    ] {
        if let Err(e) = session.remove::<String>(key).await {
            tracing::warn!(key, "Failed to clear session key: {e}");
        }
    }
}

// =============================================================================
// Page Assembly
// =============================================================================

/// Build the full checkout page for the given form state.
///
/// The cascade is replayed from the form's selected codes so re-renders keep
/// the shopper's district/ward lists populated.
async fn build_page(
    state: &AppState,
    draft: &CheckoutDraft,
    form: CheckoutForm,
    errors: FieldErrors,
    banner: Option<String>,
) -> CheckoutShowTemplate {
    let directory = state.address();

    let mut cascade = AddressCascade::default();
    cascade.load_provinces(directory).await;
    if !form.province.is_empty() {
        cascade.select_province(&form.province, directory).await;
    }
    if !form.district.is_empty() {
        cascade.select_district(&form.district, directory).await;
    }
    cascade.select_ward(&form.ward);

    let address_complete = cascade.is_complete() && !form.street.trim().is_empty();
    let (breakdown, outcome) =
        PricingBreakdown::compute(draft, &form.coupon, form.shipping_method, address_complete);

    CheckoutShowTemplate {
        draft: DraftView::from(draft),
        provinces: cascade.provinces().clone(),
        districts: cascade.districts().clone(),
        wards: cascade.wards().clone(),
        pricing: PricingView::new(breakdown, outcome),
        address_complete,
        express: form.is_express(),
        form,
        errors,
        banner,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page over the frozen draft.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let draft = load_draft(&session).await;
    if draft.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    build_page(
        &state,
        &draft,
        CheckoutForm::default(),
        FieldErrors::default(),
        None,
    )
    .await
    .into_response()
}

/// District select query.
#[derive(Debug, Deserialize)]
pub struct DistrictsQuery {
    #[serde(default)]
    pub province: String,
}

/// District `<option>` list for a province (HTMX).
///
/// An empty province code short-circuits to the placeholder without a
/// directory request.
#[instrument(skip(state))]
pub async fn districts(
    State(state): State<AppState>,
    Query(query): Query<DistrictsQuery>,
) -> impl IntoResponse {
    let level = if query.province.is_empty() {
        LevelState::Idle
    } else {
        let result = state.address().districts(&query.province).await;
        if let Err(e) = &result {
            tracing::warn!(province = %query.province, "Failed to load districts: {e}");
        }
        LevelState::from_fetch(result)
    };

    AddressOptionsTemplate {
        level,
        placeholder: "Chọn quận/huyện",
    }
}

/// Ward select query.
#[derive(Debug, Deserialize)]
pub struct WardsQuery {
    #[serde(default)]
    pub district: String,
}

/// Ward `<option>` list for a district (HTMX).
#[instrument(skip(state))]
pub async fn wards(
    State(state): State<AppState>,
    Query(query): Query<WardsQuery>,
) -> impl IntoResponse {
    let level = if query.district.is_empty() {
        LevelState::Idle
    } else {
        let result = state.address().wards(&query.district).await;
        if let Err(e) = &result {
            tracing::warn!(district = %query.district, "Failed to load wards: {e}");
        }
        LevelState::from_fetch(result)
    };

    AddressOptionsTemplate {
        level,
        placeholder: "Chọn phường/xã",
    }
}

/// Pricing recompute form: the subset of checkout inputs pricing depends on.
#[derive(Debug, Deserialize)]
pub struct PriceForm {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub ward: String,
    /// Absent until the address is complete (the radios are hidden).
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub coupon: String,
}

impl PriceForm {
    /// A shipping address is complete when the street line and all three
    /// cascade levels are filled in.
    fn address_complete(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.province.is_empty()
            && !self.district.is_empty()
            && !self.ward.is_empty()
    }
}

/// Recompute the pricing panel and the shipping-method block (HTMX).
#[instrument(skip(session, form))]
pub async fn price(session: Session, Form(form): Form<PriceForm>) -> impl IntoResponse {
    let draft = load_draft(&session).await;
    let address_complete = form.address_complete();

    let (breakdown, outcome) =
        PricingBreakdown::compute(&draft, &form.coupon, form.shipping_method, address_complete);

    PricingSyncTemplate {
        pricing: PricingView::new(breakdown, outcome),
        address_complete,
        express: form.shipping_method == ShippingMethod::Express,
    }
}

enum ResolveFailure {
    /// Directory unreachable; transient, retryable.
    Fetch,
    /// A code the current parent list does not contain.
    Fields(Box<FieldErrors>),
}

fn find_name(units: &[AdminUnit], code: &str) -> Option<String> {
    units.iter().find(|u| u.code == code).map(|u| u.name.clone())
}

/// Coupon block for the order payload, attached only when a recognized code
/// produced a non-zero discount.
fn coupon_block(outcome: CouponOutcome) -> Option<CouponApplied> {
    match outcome {
        CouponOutcome::Applied(amount) if !amount.is_zero() => Some(CouponApplied {
            code: COUPON_CODE.to_string(),
            amount,
        }),
        CouponOutcome::Applied(_) | CouponOutcome::NotEntered | CouponOutcome::Unmatched => None,
    }
}

/// Resolve the selected codes to display names, enforcing the hierarchy: the
/// district must belong to the selected province and the ward to the selected
/// district.
async fn resolve_address(
    state: &AppState,
    form: &CheckoutForm,
) -> Result<(String, String, String), ResolveFailure> {
    let directory = state.address();

    let provinces = directory.provinces().await.map_err(|e| {
        tracing::warn!("Failed to load provinces for submission: {e}");
        ResolveFailure::Fetch
    })?;
    let Some(province) = find_name(&provinces, &form.province) else {
        return Err(ResolveFailure::Fields(Box::new(FieldErrors {
            province: Some("Vui lòng chọn tỉnh/thành phố.".to_string()),
            ..FieldErrors::default()
        })));
    };

    let districts = directory.districts(&form.province).await.map_err(|e| {
        tracing::warn!(province = %form.province, "Failed to load districts for submission: {e}");
        ResolveFailure::Fetch
    })?;
    let Some(district) = find_name(&districts, &form.district) else {
        return Err(ResolveFailure::Fields(Box::new(FieldErrors {
            district: Some("Vui lòng chọn quận/huyện.".to_string()),
            ..FieldErrors::default()
        })));
    };

    let wards = directory.wards(&form.district).await.map_err(|e| {
        tracing::warn!(district = %form.district, "Failed to load wards for submission: {e}");
        ResolveFailure::Fetch
    })?;
    let Some(ward) = find_name(&wards, &form.ward) else {
        return Err(ResolveFailure::Fields(Box::new(FieldErrors {
            ward: Some("Vui lòng chọn phường/xã.".to_string()),
            ..FieldErrors::default()
        })));
    };

    Ok((province, district, ward))
}

/// Submit the checkout form.
///
/// On success: cash-on-delivery clears the cart and lands on the success
/// page; gateway methods redirect off-site with the cart untouched until the
/// gateway confirms. On any failure the page re-renders with all state
/// intact.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let draft = load_draft(&session).await;
    if draft.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let contact = match validation::validate(&form) {
        Ok(contact) => contact,
        Err(errors) => {
            return build_page(&state, &draft, form, errors, None)
                .await
                .into_response();
        }
    };

    let (province, district, ward) = match resolve_address(&state, &form).await {
        Ok(names) => names,
        Err(ResolveFailure::Fetch) => {
            return build_page(
                &state,
                &draft,
                form,
                FieldErrors::default(),
                Some("Không tải được dữ liệu địa chỉ, vui lòng thử lại.".to_string()),
            )
            .await
            .into_response();
        }
        Err(ResolveFailure::Fields(errors)) => {
            return build_page(&state, &draft, form, *errors, None)
                .await
                .into_response();
        }
    };

    // A validated submission always has a complete address.
    let (breakdown, outcome) =
        PricingBreakdown::compute(&draft, &form.coupon, form.shipping_method, true);

    let payload = OrderPayload {
        shipping_address: ShippingAddress {
            full_name: contact.full_name,
            phone: contact.phone,
            email: contact.email,
            line1: contact.street,
            ward,
            district,
            province,
            country: "VN".to_string(),
        },
        items: draft
            .lines
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect(),
        pricing: breakdown,
        payment_method: form.payment_method,
        payment_status: form.payment_method.initial_status(),
        coupon: coupon_block(outcome),
        invoice_email: contact.invoice_email,
        placed_at: Utc::now(),
    };

    let order_id = match state.orders().create_order(&payload).await {
        Ok(id) => id,
        Err(e) => {
            sentry::capture_error(&e);
            tracing::error!("Failed to create order: {e}");
            return build_page(
                &state,
                &draft,
                form,
                FieldErrors::default(),
                Some("Đặt hàng không thành công, vui lòng thử lại.".to_string()),
            )
            .await
            .into_response();
        }
    };

    if form.payment_method.requires_redirect() {
        match state
            .payment()
            .create_payment_url(breakdown.grand_total, &order_id)
            .await
        {
            Ok(url) => Redirect::to(url.as_str()).into_response(),
            Err(e) => {
                sentry::capture_error(&e);
                tracing::error!(order_id = %order_id, "Failed to create payment URL: {e}");
                build_page(
                    &state,
                    &draft,
                    form,
                    FieldErrors::default(),
                    Some("Không tạo được liên kết thanh toán, vui lòng thử lại.".to_string()),
                )
                .await
                .into_response()
            }
        }
    } else {
        clear_checkout_state(&session).await;
        Redirect::to(&format!("/checkout/success?order={}", order_id.as_str()))
            .into_response()
    }
}

/// Order success query.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub order: String,
}

/// Order success page.
#[instrument]
pub async fn success(Query(query): Query<SuccessQuery>) -> Response {
    if query.order.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    SuccessTemplate {
        order_id: query.order,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::cart::CartLine;
    use booknest_core::ProductId;

    fn price_form(street: &str) -> PriceForm {
        PriceForm {
            street: street.to_string(),
            province: "01".to_string(),
            district: "001".to_string(),
            ward: "00101".to_string(),
            shipping_method: ShippingMethod::Express,
            coupon: String::new(),
        }
    }

    fn one_line_draft() -> CheckoutDraft {
        CheckoutDraft {
            lines: vec![CartLine {
                product_id: ProductId::new("p1"),
                title: "Book".to_string(),
                unit_price: Price::new(100_000),
                previous_unit_price: None,
                image: String::new(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn test_address_complete_requires_street() {
        assert!(price_form("12 Phố Huế").address_complete());
        assert!(!price_form("").address_complete());
        assert!(!price_form("   ").address_complete());

        let mut form = price_form("12 Phố Huế");
        form.ward = String::new();
        assert!(!form.address_complete());
    }

    #[test]
    fn test_empty_street_suppresses_express_fee() {
        let draft = one_line_draft();
        let form = price_form("");
        let (breakdown, _) = PricingBreakdown::compute(
            &draft,
            &form.coupon,
            form.shipping_method,
            form.address_complete(),
        );

        assert_eq!(breakdown.shipping_fee, Price::ZERO);
        assert_eq!(breakdown.grand_total, Price::new(100_000));
    }

    #[test]
    fn test_complete_address_applies_express_fee() {
        let draft = one_line_draft();
        let form = price_form("12 Phố Huế");
        let (breakdown, _) = PricingBreakdown::compute(
            &draft,
            &form.coupon,
            form.shipping_method,
            form.address_complete(),
        );

        assert_eq!(breakdown.shipping_fee, Price::new(30_000));
    }

    #[test]
    fn test_coupon_block_skipped_when_discount_is_zero() {
        assert!(coupon_block(CouponOutcome::Applied(Price::ZERO)).is_none());
        assert!(coupon_block(CouponOutcome::NotEntered).is_none());
        assert!(coupon_block(CouponOutcome::Unmatched).is_none());

        let block = coupon_block(CouponOutcome::Applied(Price::new(25_000))).unwrap();
        assert_eq!(block.code, COUPON_CODE);
        assert_eq!(block.amount, Price::new(25_000));
    }
}
