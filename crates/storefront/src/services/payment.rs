//! Client for the payment-redirect collaborator.
//!
//! For gateway methods the backend builds the signed VNPay redirect URL; the
//! storefront only hands over the amount and order identifier and follows
//! the returned URL. Nothing about the gateway protocol lives here.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use booknest_core::{OrderId, Price};

use crate::config::BackendApiConfig;

/// Errors from the payment collaborator.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The returned redirect URL is missing or malformed.
    #[error("Invalid redirect URL: {0}")]
    BadRedirect(String),
}

#[derive(Debug, Serialize)]
struct CreatePaymentUrlRequest<'a> {
    amount: Price,
    order_id: &'a OrderId,
}

#[derive(Debug, Deserialize)]
struct CreatePaymentUrlResponse {
    url: String,
}

/// Client for the payment URL endpoint of the backend.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    base_url: String,
    api_token: SecretString,
}

impl PaymentClient {
    /// Create a new payment client.
    #[must_use]
    pub fn new(config: &BackendApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    /// Request a gateway redirect URL for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend does not answer
    /// with a parseable absolute URL.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_payment_url(
        &self,
        amount: Price,
        order_id: &OrderId,
    ) -> Result<Url, PaymentError> {
        let url = format!("{}/payment/create-url", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&CreatePaymentUrlRequest { amount, order_id })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreatePaymentUrlResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::BadRedirect(e.to_string()))?;

        Url::parse(&body.url).map_err(|e| PaymentError::BadRedirect(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let order_id = OrderId::new("ord-42");
        let body = CreatePaymentUrlRequest {
            amount: Price::new(255_000),
            order_id: &order_id,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], 255_000);
        assert_eq!(json["order_id"], "ord-42");
    }
}
