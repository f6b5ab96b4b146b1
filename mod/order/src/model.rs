use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use menu::model::Translatable;

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of an order.
///
/// ```text
/// pending → preparing → served
///         ↘ cancelled ↙
/// ```
///
/// `served` and `cancelled` are terminal; a status never retreats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Served,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "preparing" => Some(Self::Preparing),
            "served" => Some(Self::Served),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the order has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Served | Self::Cancelled)
    }

    /// An order still on the kitchen's plate: neither served nor cancelled.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The allowed-transition table. Everything else is rejected.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing)
                | (Self::Pending, Self::Cancelled)
                | (Self::Preparing, Self::Served)
                | (Self::Preparing, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order records
// ---------------------------------------------------------------------------

/// One line within an order. Immutable once attached: name and price are
/// snapshots taken at order time, so later menu edits never retroactively
/// alter past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// Unique within the order.
    pub id: String,

    /// The catalog item that produced this line (audit reference only).
    pub menu_item_id: String,

    /// Translated-name snapshot at order time.
    pub name: Translatable,

    pub quantity: u32,

    /// Unit-price snapshot at order time.
    pub price: i64,
}

impl OrderLineItem {
    pub fn subtotal(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

/// A customer order. Identity is `id`; mutated only through status
/// transitions, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,

    /// Table label the order was placed from. Not re-validated against the
    /// current table list — tables may be removed after the fact.
    pub table_id: String,

    /// Non-empty at creation, immutable after.
    pub items: Vec<OrderLineItem>,

    pub status: OrderStatus,

    /// Creation timestamp, epoch millis.
    pub created_at: i64,

    /// `created_at` + derived preparation time. Fixed at creation, never
    /// recomputed on status change.
    pub estimated_arrival_at: i64,

    /// Sum of line subtotals, fixed at creation.
    pub total_price: i64,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// Transient customer selection: menu item id → requested quantity.
///
/// Quantities are always ≥ 1 while present; decrementing to zero removes
/// the entry. Converted into an order's line items at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<String, u32>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item.
    pub fn add(&mut self, item_id: &str) {
        *self.0.entry(item_id.to_string()).or_insert(0) += 1;
    }

    /// Remove one unit of an item; the entry disappears at zero.
    pub fn remove(&mut self, item_id: &str) {
        if let Some(count) = self.0.get_mut(item_id) {
            if *count > 1 {
                *count -= 1;
            } else {
                self.0.remove(item_id);
            }
        }
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.0.get(item_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /order/orders` — checkout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub table_id: String,
    pub cart: Cart,
}

/// Query parameters for `GET /order/orders/@active`.
#[derive(Debug, Deserialize)]
pub struct ActiveOrderQuery {
    pub table: String,
}
