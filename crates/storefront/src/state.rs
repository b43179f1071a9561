//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::address::AddressClient;
use crate::services::orders::OrdersClient;
use crate::services::payment::PaymentClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources: configuration, the session database pool, and the REST
/// collaborator clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    address: AddressClient,
    orders: OrdersClient,
    payment: PaymentClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let address = AddressClient::new(&config.address);
        let orders = OrdersClient::new(&config.api);
        let payment = PaymentClient::new(&config.api);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                address,
                orders,
                payment,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the address directory client.
    #[must_use]
    pub fn address(&self) -> &AddressClient {
        &self.inner.address
    }

    /// Get a reference to the orders client.
    #[must_use]
    pub fn orders(&self) -> &OrdersClient {
        &self.inner.orders
    }

    /// Get a reference to the payment client.
    #[must_use]
    pub fn payment(&self) -> &PaymentClient {
        &self.inner.payment
    }
}
