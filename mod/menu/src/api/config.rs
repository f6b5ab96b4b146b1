use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use tably_core::ServiceError;

use super::MenuState;
use crate::model::{Category, RestaurantData};

pub fn router(state: MenuState) -> Router {
    Router::new()
        .route("/config", get(get_config).put(replace_config))
        .route("/categories", post(create_category))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /config
// ---------------------------------------------------------------------------

async fn get_config(State(state): State<MenuState>) -> Json<RestaurantData> {
    Json(state.store.get())
}

// ---------------------------------------------------------------------------
// PUT /config
// ---------------------------------------------------------------------------

async fn replace_config(
    State(state): State<MenuState>,
    Json(data): Json<RestaurantData>,
) -> Result<Json<RestaurantData>, ServiceError> {
    let saved = state.store.replace(data)?;
    Ok(Json(saved))
}

// ---------------------------------------------------------------------------
// POST /categories
// ---------------------------------------------------------------------------

async fn create_category(
    State(state): State<MenuState>,
    Json(category): Json<Category>,
) -> Result<Json<Category>, ServiceError> {
    let created = state.store.add_category(category)?;
    Ok(Json(created))
}
