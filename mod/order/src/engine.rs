use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use menu::store::Catalog;
use tably_core::{new_id, now_millis, ServiceError};

use crate::model::{Cart, Order, OrderLineItem, OrderStatus};
use crate::store::OrderStore;

/// Order service error type.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout resolved to zero valid lines — no order is created.
    #[error("cart resolves to no orderable items")]
    EmptyCart,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for OrderError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Conflict(m) => OrderError::Conflict(m),
            ServiceError::Storage(m) => OrderError::Storage(m),
            ServiceError::NotFound(m)
            | ServiceError::Validation(m)
            | ServiceError::Internal(m) => OrderError::Internal(m),
        }
    }
}

impl From<OrderError> for ServiceError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::EmptyCart => {
                ServiceError::Validation("cart resolves to no orderable items".into())
            }
            OrderError::Conflict(m) => ServiceError::Conflict(m),
            OrderError::Storage(m) => ServiceError::Storage(m),
            OrderError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// The order lifecycle engine.
///
/// Turns a cart into an order against a read-only catalog view, and owns
/// the typed status transitions. All mutations of the order store funnel
/// through here, which is what keeps the transition table authoritative.
pub struct OrderEngine {
    store: Arc<OrderStore>,
    catalog: Arc<dyn Catalog>,
}

impl OrderEngine {
    pub fn new(store: Arc<OrderStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }

    // =======================================================================
    // Checkout
    // =======================================================================

    /// Create an order from a cart.
    ///
    /// Cart lines whose menu item no longer exists are dropped — the catalog
    /// may have changed since the customer opened the menu. The estimated
    /// preparation time is the maximum over the surviving lines (service for
    /// a table is gated by the slowest concurrently-prepared dish), with
    /// unconfigured items assumed to take the default.
    pub fn checkout(&self, table_id: &str, cart: &Cart) -> Result<Order, OrderError> {
        let mut resolved = Vec::new();
        for (item_id, &quantity) in cart.iter() {
            if quantity == 0 {
                continue;
            }
            match self.catalog.find_item(item_id)? {
                Some(item) => resolved.push((item, quantity)),
                None => {
                    debug!("cart references unknown menu item {item_id}, dropping line");
                }
            }
        }

        if resolved.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let prep_minutes = resolved
            .iter()
            .map(|(item, _)| item.prep_minutes())
            .max()
            .unwrap_or(0);

        let items: Vec<OrderLineItem> = resolved
            .into_iter()
            .map(|(item, quantity)| OrderLineItem {
                id: new_id(),
                menu_item_id: item.id,
                name: item.name,
                quantity,
                price: item.price,
            })
            .collect();

        let created_at = now_millis();
        let order = Order {
            id: new_id(),
            table_id: table_id.to_string(),
            total_price: items.iter().map(|l| l.subtotal()).sum(),
            items,
            status: OrderStatus::Pending,
            created_at,
            estimated_arrival_at: created_at + i64::from(prep_minutes) * 60_000,
        };

        self.store.append(order.clone())?;
        info!(
            order = %order.id,
            table = %order.table_id,
            total = order.total_price,
            "order placed"
        );
        Ok(order)
    }

    // =======================================================================
    // Status transitions — operator-facing
    // =======================================================================

    /// pending → preparing: the kitchen starts on the order.
    pub fn start(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        self.apply(order_id, OrderStatus::Preparing)
    }

    /// preparing → served: the order was delivered to the table.
    pub fn ready(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        self.apply(order_id, OrderStatus::Served)
    }

    /// pending|preparing → cancelled.
    pub fn cancel(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        self.apply(order_id, OrderStatus::Cancelled)
    }

    fn apply(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let updated = self.store.update_status(order_id, new_status)?;
        if let Some(order) = &updated {
            info!(order = %order.id, status = %order.status, "order status updated");
        }
        Ok(updated)
    }
}
