use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use tably_core::ServiceError;

use super::MenuState;
use crate::model::{MenuItem, SuggestRequest, SuggestResponse};

pub fn router(state: MenuState) -> Router {
    Router::new()
        .route("/items", post(create_item))
        .route(
            "/items/{id}",
            axum::routing::patch(update_item).delete(delete_item),
        )
        .route("/items/{id}/@suggest", post(suggest_description))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// POST /items
// ---------------------------------------------------------------------------

async fn create_item(
    State(state): State<MenuState>,
    Json(item): Json<MenuItem>,
) -> Result<Json<MenuItem>, ServiceError> {
    let created = state.store.add_item(item)?;
    Ok(Json(created))
}

// ---------------------------------------------------------------------------
// PATCH /items/:id
// ---------------------------------------------------------------------------

async fn update_item(
    State(state): State<MenuState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<MenuItem>, ServiceError> {
    let updated = state.store.update_item(&id, patch)?;
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// DELETE /items/:id
// ---------------------------------------------------------------------------

async fn delete_item(
    State(state): State<MenuState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.store.remove_item(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// POST /items/:id/@suggest
// ---------------------------------------------------------------------------

/// An empty `suggestion` means "no suggestion available"; the editor
/// leaves the existing description untouched in that case.
async fn suggest_description(
    State(state): State<MenuState>,
    Path(id): Path<String>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ServiceError> {
    let data = state.store.get();
    let item = data
        .find_item(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("menu item '{id}'")))?;

    let item_name = item.name.get(req.language).to_string();
    let category_name = data
        .find_category(&item.category)
        .map(|c| c.name.get(req.language).to_string())
        .unwrap_or_default();

    let suggestion = state
        .suggest
        .suggest(&id, &item_name, &category_name, req.language)
        .await;
    Ok(Json(SuggestResponse { suggestion }))
}
