mod config;
mod items;
mod tables;

use std::sync::Arc;

use axum::Router;

use crate::store::MenuStore;
use crate::suggest::SuggestService;

/// Shared state for menu handlers.
#[derive(Clone)]
pub struct MenuState {
    pub store: Arc<MenuStore>,
    pub suggest: Arc<SuggestService>,
}

/// Build the complete menu module router.
///
/// Routes:
/// - `GET    /config`               — full restaurant configuration
/// - `PUT    /config`               — replace configuration (editor save)
/// - `POST   /items`                — add menu item
/// - `PATCH  /items/{id}`           — merge-patch menu item
/// - `DELETE /items/{id}`           — remove menu item
/// - `POST   /items/{id}/@suggest`  — AI description suggestion
/// - `POST   /categories`           — add category
/// - `POST   /tables`               — add table
/// - `DELETE /tables/{label}`       — remove table
pub fn router(store: Arc<MenuStore>, suggest: Arc<SuggestService>) -> Router {
    let state = MenuState { store, suggest };
    Router::new()
        .merge(config::router(state.clone()))
        .merge(items::router(state.clone()))
        .merge(tables::router(state))
}
