//! Route registration — entry surface, share center, system endpoints,
//! and the module routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use menu::store::MenuStore;
use order::store::OrderStore;
use order::tracking::TrackingSnapshot;
use tably_core::{now_millis, ServiceError};

use crate::config::ServerConfig;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub menu: Arc<MenuStore>,
    pub orders: Arc<OrderStore>,
    pub config: Arc<ServerConfig>,
}

/// Build the complete router with all routes.
pub fn build_router(state: AppState, module_routes: Vec<(&str, Router)>) -> Router {
    // System endpoints (public, no state needed).
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router<()> = Router::new()
        .route("/", get(entry))
        .route("/share", get(share_all))
        .route("/share/{table}", get(share_one))
        .with_state(state);

    app = app.merge(system_routes);

    // Mount each module's routes under /{module_name}.
    // Module routes are already Router<()> (they called .with_state() internally).
    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app
}

// ---------------------------------------------------------------------------
// Entry surface
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EntryQuery {
    table: Option<String>,
}

/// The application entry point.
///
/// With `?table=N` the application runs in customer mode scoped to that
/// table — operator navigation is suppressed and the payload carries the
/// menu plus the table's active order (if any) with its tracking snapshot.
/// Without the parameter the application runs in operator mode. The
/// operator previews any table's customer view by passing `?table=`.
async fn entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Json<serde_json::Value> {
    match query.table {
        Some(table) => {
            let active = state
                .orders
                .find_active_for_table(&table)
                .map(|order| TrackingSnapshot::capture(order, now_millis()));
            Json(serde_json::json!({
                "mode": "customer",
                "table": table,
                "menu": state.menu.get(),
                "activeOrder": active,
            }))
        }
        None => {
            let data = state.menu.get();
            Json(serde_json::json!({
                "mode": "operator",
                "views": ["editor", "dashboard", "share"],
                "tables": data.tables,
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Share center
// ---------------------------------------------------------------------------

// Builds the per-table URLs a customer scans. Rendering them as QR images
// (and exporting PNGs) is the client's job — no interaction with order
// state.

fn share_url(config: &ServerConfig, table: &str) -> String {
    format!(
        "{}/?table={}",
        config.server.base_url.trim_end_matches('/'),
        table
    )
}

async fn share_all(State(state): State<AppState>) -> Json<serde_json::Value> {
    let data = state.menu.get();
    let entries: Vec<serde_json::Value> = data
        .tables
        .iter()
        .map(|t| {
            serde_json::json!({
                "table": t,
                "url": share_url(&state.config, t),
            })
        })
        .collect();
    Json(serde_json::json!({ "tables": entries }))
}

async fn share_one(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let data = state.menu.get();
    if !data.tables.iter().any(|t| *t == table) {
        return Err(ServiceError::NotFound(format!("table '{table}'")));
    }
    Ok(Json(serde_json::json!({
        "table": table,
        "url": share_url(&state.config, &table),
    })))
}

// ---------------------------------------------------------------------------
// System endpoints
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "tablyd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_building() {
        let mut config = ServerConfig::default();
        config.server.base_url = "https://menu.example.com/".to_string();
        assert_eq!(
            share_url(&config, "12"),
            "https://menu.example.com/?table=12"
        );
    }
}
