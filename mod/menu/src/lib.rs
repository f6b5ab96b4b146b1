pub mod api;
pub mod model;
pub mod store;
pub mod suggest;

use std::sync::Arc;

use axum::Router;

use tably_core::{Module, ServiceError};
use tably_kv::KVStore;

use store::MenuStore;
use suggest::{SuggestService, Suggester};

/// The Menu module — restaurant configuration, multilingual menu CRUD, and
/// the AI description-suggestion surface.
pub struct MenuModule {
    store: Arc<MenuStore>,
    suggest: Arc<SuggestService>,
}

impl MenuModule {
    /// Create the menu module. `suggester` is optional; without one the
    /// suggestion endpoint always answers with the empty string.
    pub fn new(
        kv: Arc<dyn KVStore>,
        suggester: Option<Arc<dyn Suggester>>,
    ) -> Result<Self, ServiceError> {
        let store = MenuStore::open(kv)?;
        let suggest = SuggestService::new(suggester);
        Ok(Self { store, suggest })
    }

    /// Get a reference to the MenuStore (also the order module's Catalog).
    pub fn store(&self) -> &Arc<MenuStore> {
        &self.store
    }
}

impl Module for MenuModule {
    fn name(&self) -> &str {
        "menu"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.store), Arc::clone(&self.suggest))
    }
}
