use serde::Serialize;

use crate::model::{Order, OrderStatus};

/// The operator's triage board: all orders grouped into exactly three
/// displayed columns. Cancelled orders are excluded from display entirely
/// but remain in the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageBoard {
    pub pending: Vec<Order>,
    pub preparing: Vec<Order>,
    pub served: Vec<Order>,
}

impl TriageBoard {
    /// Partition a store-ordered (most-recent-first) order list into
    /// columns, preserving that order within each column.
    pub fn build(orders: Vec<Order>) -> Self {
        let mut board = Self {
            pending: Vec::new(),
            preparing: Vec::new(),
            served: Vec::new(),
        };
        for order in orders {
            match order.status {
                OrderStatus::Pending => board.pending.push(order),
                OrderStatus::Preparing => board.preparing.push(order),
                OrderStatus::Served => board.served.push(order),
                OrderStatus::Cancelled => {}
            }
        }
        board
    }

    /// Column sizes as (pending, preparing, served).
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.pending.len(), self.preparing.len(), self.served.len())
    }
}

/// One operator action on an order card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    /// pending → preparing.
    Start,
    /// preparing → served.
    Ready,
    /// Any non-terminal order can be cancelled.
    Cancel,
}

impl OrderAction {
    /// The actions the dashboard offers for an order in this status.
    pub fn available_for(status: OrderStatus) -> Vec<OrderAction> {
        match status {
            OrderStatus::Pending => vec![OrderAction::Start, OrderAction::Cancel],
            OrderStatus::Preparing => vec![OrderAction::Ready, OrderAction::Cancel],
            OrderStatus::Served | OrderStatus::Cancelled => Vec::new(),
        }
    }
}
