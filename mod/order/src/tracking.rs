use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use menu::model::Translatable;
use tably_core::now_millis;

use crate::model::{Order, OrderStatus};
use crate::store::OrderStore;

// ---------------------------------------------------------------------------
// Status narrative
// ---------------------------------------------------------------------------

/// Customer-facing copy for one order status: headline, subtext, and a
/// coarse progress percentage for the progress-bar visualization. Purely
/// presentational — has no effect on state transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub headline: Translatable,
    pub subtext: Translatable,
    pub progress: u8,
}

/// The static status → narrative table (pending/preparing/served/default).
pub fn narrative(status: OrderStatus) -> Narrative {
    match status {
        OrderStatus::Pending => Narrative {
            headline: Translatable::new(
                "Buyurtma qabul qilindi",
                "Заказ принят",
                "Order received",
            ),
            subtext: Translatable::new(
                "Tez orada oshpaz ishga kirishadi",
                "Повар скоро приступит к работе",
                "The chef will start on it shortly",
            ),
            progress: 25,
        },
        OrderStatus::Preparing => Narrative {
            headline: Translatable::new(
                "Oshpaz tayyorlamoqda",
                "Повар готовит",
                "The chef is cooking",
            ),
            subtext: Translatable::new(
                "Sizning taomingiz olovda",
                "Ваше блюдо на огне",
                "Your dish is on the fire",
            ),
            progress: 60,
        },
        OrderStatus::Served => Narrative {
            headline: Translatable::new(
                "Yoqimli ishtaha!",
                "Приятного аппетита!",
                "Enjoy your meal!",
            ),
            subtext: Translatable::new(
                "Taom stolingizga yetkazildi",
                "Блюдо доставлено на ваш стол",
                "Delivered to your table",
            ),
            progress: 100,
        },
        _ => Narrative {
            headline: Translatable::new(
                "Holat noma'lum",
                "Статус неизвестен",
                "Status unknown",
            ),
            subtext: Translatable::default(),
            progress: 0,
        },
    }
}

// ---------------------------------------------------------------------------
// TrackingSnapshot
// ---------------------------------------------------------------------------

/// What the customer tracking view shows for one order at one instant.
///
/// The countdown clamps at zero; the displayed status is driven purely by
/// `order.status`. The timer is advisory — an operator may mark an order
/// served before or after it expires, and the view tolerates both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSnapshot {
    pub order: Order,
    pub remaining_secs: u64,
    pub narrative: Narrative,
}

impl TrackingSnapshot {
    pub fn capture(order: Order, now_millis: i64) -> Self {
        let remaining_secs = ((order.estimated_arrival_at - now_millis).max(0) / 1000) as u64;
        let narrative = narrative(order.status);
        Self {
            order,
            remaining_secs,
            narrative,
        }
    }
}

/// Format a countdown as `MM:SS`.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ---------------------------------------------------------------------------
// TrackingSession — the per-second recomputation
// ---------------------------------------------------------------------------

/// A live tracking session for one order.
///
/// Re-reads the store once per tick and publishes a fresh snapshot on a
/// watch channel. The ticker never mutates shared state. It stops by itself
/// once the order reaches a terminal status, and dropping the session
/// cancels it immediately — a torn-down view can never tick against stale
/// state.
pub struct TrackingSession {
    cancel: CancellationToken,
    rx: watch::Receiver<TrackingSnapshot>,
}

impl TrackingSession {
    /// Start tracking with the standard one-second tick.
    pub fn start(store: Arc<OrderStore>, order_id: &str) -> Option<Self> {
        Self::start_with_period(store, order_id, Duration::from_secs(1))
    }

    /// Start tracking with an explicit tick period.
    ///
    /// Returns `None` when the order does not exist.
    pub fn start_with_period(
        store: Arc<OrderStore>,
        order_id: &str,
        period: Duration,
    ) -> Option<Self> {
        let order = store.get(order_id)?;
        let (tx, rx) = watch::channel(TrackingSnapshot::capture(order, now_millis()));
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();
            let order_id = order_id.to_string();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            debug!("tracking session for order {order_id} cancelled");
                            break;
                        }
                        _ = tokio::time::sleep(period) => {
                            let Some(order) = store.get(&order_id) else {
                                break;
                            };
                            let terminal = order.status.is_terminal();
                            let snapshot = TrackingSnapshot::capture(order, now_millis());
                            if tx.send(snapshot).is_err() {
                                break;
                            }
                            if terminal {
                                debug!("order {order_id} is terminal, tracking stopped");
                                break;
                            }
                        }
                    }
                }
            });
        }

        Some(Self { cancel, rx })
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot. Returns `false` once the
    /// ticker has stopped for good.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderLineItem;
    use tably_kv::{KVStore, RedbStore};

    fn make_order(id: &str, status: OrderStatus, eta_offset_millis: i64) -> Order {
        let now = now_millis();
        Order {
            id: id.into(),
            table_id: "3".into(),
            items: vec![OrderLineItem {
                id: "l1".into(),
                menu_item_id: "m1".into(),
                name: Translatable::new("Osh", "Плов", "Plov"),
                quantity: 1,
                price: 38000,
            }],
            status,
            created_at: now,
            estimated_arrival_at: now + eta_offset_millis,
            total_price: 38000,
        }
    }

    fn test_store(dir: &tempfile::TempDir) -> Arc<OrderStore> {
        let kv: Arc<dyn KVStore> =
            Arc::new(RedbStore::open(&dir.path().join("kv.redb")).unwrap());
        OrderStore::open(kv).unwrap()
    }

    #[test]
    fn narrative_table() {
        assert_eq!(narrative(OrderStatus::Pending).progress, 25);
        assert_eq!(narrative(OrderStatus::Preparing).progress, 60);
        assert_eq!(narrative(OrderStatus::Served).progress, 100);
        assert_eq!(narrative(OrderStatus::Cancelled).progress, 0);
        assert_eq!(
            narrative(OrderStatus::Preparing).headline.ru,
            "Повар готовит"
        );
    }

    #[test]
    fn snapshot_countdown_clamps_at_zero() {
        let order = make_order("a", OrderStatus::Preparing, 90_000);
        let now = order.created_at;

        let snap = TrackingSnapshot::capture(order.clone(), now);
        assert_eq!(snap.remaining_secs, 90);

        // Past the ETA the countdown clamps; status still drives the view.
        let snap = TrackingSnapshot::capture(order, now + 300_000);
        assert_eq!(snap.remaining_secs, 0);
        assert_eq!(snap.narrative.progress, 60);
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(1200), "20:00");
    }

    #[tokio::test]
    async fn session_tracks_status_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.append(make_order("a", OrderStatus::Pending, 600_000)).unwrap();

        let mut session =
            TrackingSession::start_with_period(Arc::clone(&store), "a", Duration::from_millis(10))
                .unwrap();
        assert_eq!(session.snapshot().order.status, OrderStatus::Pending);

        store.update_status("a", OrderStatus::Preparing).unwrap();
        assert!(session.changed().await);
        assert_eq!(session.snapshot().order.status, OrderStatus::Preparing);
        assert_eq!(session.snapshot().narrative.progress, 60);
    }

    #[tokio::test]
    async fn session_stops_on_terminal_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.append(make_order("a", OrderStatus::Preparing, 600_000)).unwrap();

        let mut session =
            TrackingSession::start_with_period(Arc::clone(&store), "a", Duration::from_millis(10))
                .unwrap();

        store.update_status("a", OrderStatus::Served).unwrap();

        // One final snapshot with the terminal status, then the ticker ends.
        assert!(session.changed().await);
        assert_eq!(session.snapshot().order.status, OrderStatus::Served);
        assert!(!session.changed().await);
    }

    #[tokio::test]
    async fn dropping_session_cancels_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.append(make_order("a", OrderStatus::Pending, 600_000)).unwrap();

        let session =
            TrackingSession::start_with_period(store, "a", Duration::from_millis(10)).unwrap();
        let cancel = session.cancel.clone();

        assert!(!cancel.is_cancelled());
        drop(session);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn session_for_unknown_order_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        assert!(TrackingSession::start(store, "ghost").is_none());
    }
}
