use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use tably_core::ServiceError;

use super::MenuState;
use crate::model::NewTableRequest;

pub fn router(state: MenuState) -> Router {
    Router::new()
        .route("/tables", post(add_table))
        .route("/tables/{label}", axum::routing::delete(remove_table))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// POST /tables
// ---------------------------------------------------------------------------

async fn add_table(
    State(state): State<MenuState>,
    Json(req): Json<NewTableRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let tables = state.store.add_table(&req.label)?;
    Ok(Json(serde_json::json!({ "tables": tables })))
}

// ---------------------------------------------------------------------------
// DELETE /tables/:label
// ---------------------------------------------------------------------------

async fn remove_table(
    State(state): State<MenuState>,
    Path(label): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let tables = state.store.remove_table(&label)?;
    Ok(Json(serde_json::json!({ "tables": tables })))
}
