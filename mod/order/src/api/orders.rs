use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use tably_core::{now_millis, ServiceError};

use crate::board::TriageBoard;
use crate::engine::OrderEngine;
use crate::model::{ActiveOrderQuery, CheckoutRequest, Order};
use crate::tracking::TrackingSnapshot;

type EngineState = Arc<OrderEngine>;

pub fn router(engine: Arc<OrderEngine>) -> Router {
    Router::new()
        .route("/orders", post(place_order).get(list_orders))
        .route("/orders/@board", get(board))
        .route("/orders/@active", get(active_for_table))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/@track", get(track_order))
        .route("/orders/{id}/@start", post(start_order))
        .route("/orders/{id}/@ready", post(ready_order))
        .route("/orders/{id}/@cancel", post(cancel_order))
        .with_state(engine)
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

async fn place_order(
    State(engine): State<EngineState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<Order>, ServiceError> {
    let order = engine.checkout(&req.table_id, &req.cart)?;
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

async fn list_orders(State(engine): State<EngineState>) -> Json<serde_json::Value> {
    let items = engine.store().list_all();
    Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    }))
}

// ---------------------------------------------------------------------------
// GET /orders/@board
// ---------------------------------------------------------------------------

async fn board(State(engine): State<EngineState>) -> Json<TriageBoard> {
    Json(TriageBoard::build(engine.store().list_all()))
}

// ---------------------------------------------------------------------------
// GET /orders/@active?table=N
// ---------------------------------------------------------------------------

/// `null` when the table has no active order — the customer view shows its
/// empty state.
async fn active_for_table(
    State(engine): State<EngineState>,
    Query(query): Query<ActiveOrderQuery>,
) -> Json<Option<Order>> {
    Json(engine.store().find_active_for_table(&query.table))
}

// ---------------------------------------------------------------------------
// GET /orders/:id
// ---------------------------------------------------------------------------

async fn get_order(
    State(engine): State<EngineState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ServiceError> {
    let order = engine
        .store()
        .get(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("order '{id}'")))?;
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// GET /orders/:id/@track
// ---------------------------------------------------------------------------

async fn track_order(
    State(engine): State<EngineState>,
    Path(id): Path<String>,
) -> Result<Json<TrackingSnapshot>, ServiceError> {
    let order = engine
        .store()
        .get(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("order '{id}'")))?;
    Ok(Json(TrackingSnapshot::capture(order, now_millis())))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

// Each returns the updated order, or `null` when the transition was a
// no-op (unknown id, or the order already left the source column).

async fn start_order(
    State(engine): State<EngineState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Order>>, ServiceError> {
    Ok(Json(engine.start(&id)?))
}

async fn ready_order(
    State(engine): State<EngineState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Order>>, ServiceError> {
    Ok(Json(engine.ready(&id)?))
}

async fn cancel_order(
    State(engine): State<EngineState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Order>>, ServiceError> {
    Ok(Json(engine.cancel(&id)?))
}
