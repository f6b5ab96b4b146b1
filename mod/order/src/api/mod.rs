mod orders;

use std::sync::Arc;

use axum::Router;

use crate::engine::OrderEngine;

/// Build the complete order module router.
///
/// Routes:
/// - `POST /orders`               — checkout (create order from cart)
/// - `GET  /orders`               — full order list, most-recent-first
/// - `GET  /orders/@board`        — operator triage board
/// - `GET  /orders/@active`       — active order for a table (`?table=`)
/// - `GET  /orders/{id}`          — get order
/// - `GET  /orders/{id}/@track`   — customer tracking snapshot
/// - `POST /orders/{id}/@start`   — pending → preparing
/// - `POST /orders/{id}/@ready`   — preparing → served
/// - `POST /orders/{id}/@cancel`  — cancel a non-served order
pub fn router(engine: Arc<OrderEngine>) -> Router {
    orders::router(engine)
}
