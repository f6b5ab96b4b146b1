pub mod api;
pub mod board;
pub mod engine;
pub mod model;
pub mod store;
pub mod tracking;

use std::sync::Arc;

use axum::Router;

use menu::store::Catalog;
use tably_core::{Module, ServiceError};
use tably_kv::KVStore;

use engine::OrderEngine;
use store::OrderStore;

/// The Order module — order lifecycle, durable order store, customer
/// tracking view, and the operator triage board.
pub struct OrderModule {
    engine: Arc<OrderEngine>,
    store: Arc<OrderStore>,
}

impl OrderModule {
    /// Create the order module. `catalog` is the read-only menu view orders
    /// are resolved against at checkout.
    pub fn new(
        kv: Arc<dyn KVStore>,
        catalog: Arc<dyn Catalog>,
    ) -> Result<Self, ServiceError> {
        let store = OrderStore::open(kv)?;
        let engine = Arc::new(OrderEngine::new(Arc::clone(&store), catalog));
        Ok(Self { engine, store })
    }

    /// Get a reference to the OrderEngine.
    pub fn engine(&self) -> &Arc<OrderEngine> {
        &self.engine
    }

    /// Get a reference to the OrderStore.
    pub fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }
}

impl Module for OrderModule {
    fn name(&self) -> &str {
        "order"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.engine))
    }
}
