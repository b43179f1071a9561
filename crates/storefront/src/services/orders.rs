//! Client for the order-creation backend.
//!
//! The storefront assembles the full order payload (address, items, pricing
//! breakdown, payment method/status, coupon) and delegates persistence to
//! the backend, which answers with the order identifier used for post-order
//! navigation and payment redirect construction.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use booknest_core::{Email, OrderId, Phone, Price, ProductId};

use crate::checkout::pricing::PricingBreakdown;
use crate::config::BackendApiConfig;
use crate::models::checkout::{PaymentMethod, PaymentStatus};

/// Errors from the order backend.
#[derive(Debug, Error)]
pub enum OrderApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Normalized shipping address sent with the order.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: Phone,
    pub email: Email,
    pub line1: String,
    pub ward: String,
    pub district: String,
    pub province: String,
    pub country: String,
}

/// One purchased line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Applied coupon, attached only when the discount is non-zero.
#[derive(Debug, Clone, Serialize)]
pub struct CouponApplied {
    pub code: String,
    pub amount: Price,
}

/// The assembled order handed to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub pricing: PricingBreakdown,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponApplied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_email: Option<Email>,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: OrderId,
}

/// Client for the order backend.
#[derive(Clone)]
pub struct OrdersClient {
    client: reqwest::Client,
    base_url: String,
    api_token: SecretString,
}

impl OrdersClient {
    /// Create a new orders client.
    #[must_use]
    pub fn new(config: &BackendApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    /// Create an order and return its backend-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects the
    /// payload, or the response cannot be parsed. The caller leaves all
    /// checkout state intact on error so the shopper can retry.
    #[instrument(skip(self, payload), fields(items = payload.items.len()))]
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderId, OrderApiError> {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| OrderApiError::Parse(e.to_string()))?;

        Ok(created.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use booknest_core::Price;

    fn payload(discount: i64) -> OrderPayload {
        OrderPayload {
            shipping_address: ShippingAddress {
                full_name: "Nguyễn Văn An".to_string(),
                phone: Phone::parse("0987654321").unwrap(),
                email: Email::parse("an@example.com").unwrap(),
                line1: "12 Phố Huế".to_string(),
                ward: "Phúc Xá".to_string(),
                district: "Ba Đình".to_string(),
                province: "Hà Nội".to_string(),
                country: "VN".to_string(),
            },
            items: vec![OrderItem {
                product_id: ProductId::new("p1"),
                quantity: 2,
                price: Price::new(100_000),
            }],
            pricing: PricingBreakdown {
                subtotal: Price::new(200_000),
                discount: Price::new(discount),
                shipping_fee: Price::ZERO,
                grand_total: Price::new(200_000 - discount),
            },
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentMethod::Cod.initial_status(),
            coupon: (discount > 0).then(|| CouponApplied {
                code: "GIAM10".to_string(),
                amount: Price::new(discount),
            }),
            invoice_email: None,
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_payload_serializes_snake_case_methods() {
        let json = serde_json::to_value(payload(0)).unwrap();
        assert_eq!(json["payment_method"], "cod");
        assert_eq!(json["payment_status"], "unpaid");
        assert_eq!(json["shipping_address"]["country"], "VN");
    }

    #[test]
    fn test_zero_discount_omits_coupon() {
        let json = serde_json::to_value(payload(0)).unwrap();
        assert!(json.get("coupon").is_none());

        let json = serde_json::to_value(payload(20_000)).unwrap();
        assert_eq!(json["coupon"]["code"], "GIAM10");
        assert_eq!(json["coupon"]["amount"], 20_000);
    }
}
