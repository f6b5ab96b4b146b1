use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use tably_core::ServiceError;
use tably_kv::KVStore;

use crate::model::{Order, OrderStatus};

/// KV key holding the full order list blob (a JSON array).
const ORDERS_KEY: &str = "orders:all";

/// Durable, process-wide list of every order ever created.
///
/// Single source of truth for both the operator dashboard and the customer
/// tracking view. The in-memory list is kept most-recent-first and mirrored
/// to the `orders:all` blob on every mutation: each commit atomically
/// replaces the whole snapshot, so a restart recovers exactly the
/// last-committed state. Orders are never deleted.
pub struct OrderStore {
    kv: Arc<dyn KVStore>,
    orders: RwLock<Vec<Order>>,
}

impl OrderStore {
    /// Open the store, loading the persisted order list.
    ///
    /// An unparsable blob degrades to the empty list with a logged
    /// warning — never a crash.
    pub fn open(kv: Arc<dyn KVStore>) -> Result<Arc<Self>, ServiceError> {
        let orders = match kv.get(ORDERS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Order>>(&bytes) {
                Ok(orders) => orders,
                Err(e) => {
                    warn!("orders blob unparsable ({e}), starting from an empty list");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };

        Ok(Arc::new(Self {
            kv,
            orders: RwLock::new(orders),
        }))
    }

    /// Append a new order at the front (most-recent-first).
    ///
    /// Fails with `Conflict` if an order with the same id already exists;
    /// id generation is the caller's responsibility.
    pub fn append(&self, order: Order) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().expect("order lock poisoned");
        if orders.iter().any(|o| o.id == order.id) {
            return Err(ServiceError::Conflict(format!(
                "order '{}' already exists",
                order.id
            )));
        }
        orders.insert(0, order);
        self.persist(&orders)
    }

    /// Full ordered sequence of orders, most-recent-first.
    pub fn list_all(&self) -> Vec<Order> {
        self.orders.read().expect("order lock poisoned").clone()
    }

    /// Number of orders in the store.
    pub fn count(&self) -> usize {
        self.orders.read().expect("order lock poisoned").len()
    }

    /// Look up one order by id.
    pub fn get(&self, id: &str) -> Option<Order> {
        self.orders
            .read()
            .expect("order lock poisoned")
            .iter()
            .find(|o| o.id == id)
            .cloned()
    }

    /// The most recently created order for a table whose status is still
    /// active, or none. The list is most-recent-first, so the first match
    /// wins — the deterministic tie-break when a table somehow carries
    /// several active orders.
    pub fn find_active_for_table(&self, table_id: &str) -> Option<Order> {
        self.orders
            .read()
            .expect("order lock poisoned")
            .iter()
            .find(|o| o.table_id == table_id && o.is_active())
            .cloned()
    }

    /// Apply a status transition.
    ///
    /// An unknown order id or a transition outside the allowed table is a
    /// silent no-op returning `None` — stale UI references are expected,
    /// not errors. Returns the updated order on success.
    pub fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Option<Order>, ServiceError> {
        let mut orders = self.orders.write().expect("order lock poisoned");

        let Some(order) = orders.iter_mut().find(|o| o.id == order_id) else {
            debug!("transition for unknown order {order_id} ignored");
            return Ok(None);
        };
        if !order.status.can_transition_to(new_status) {
            debug!(
                "transition {} -> {} for order {order_id} rejected",
                order.status, new_status
            );
            return Ok(None);
        }

        order.status = new_status;
        let updated = order.clone();
        self.persist(&orders)?;
        Ok(Some(updated))
    }

    /// Commit the full order-list snapshot.
    fn persist(&self, orders: &[Order]) -> Result<(), ServiceError> {
        let bytes =
            serde_json::to_vec(orders).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv
            .set(ORDERS_KEY, &bytes)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tably_kv::RedbStore;

    fn test_kv(dir: &tempfile::TempDir) -> Arc<dyn KVStore> {
        Arc::new(RedbStore::open(&dir.path().join("kv.redb")).unwrap())
    }

    fn make_order(id: &str, table: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            table_id: table.into(),
            items: vec![],
            status,
            created_at: 1_700_000_000_000,
            estimated_arrival_at: 1_700_000_900_000,
            total_price: 45000,
        }
    }

    #[test]
    fn append_and_list_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        store.append(make_order("a", "1", OrderStatus::Pending)).unwrap();
        store.append(make_order("b", "2", OrderStatus::Pending)).unwrap();

        let all = store.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "b");
        assert_eq!(all[1].id, "a");
    }

    #[test]
    fn append_rejects_duplicate_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        store.append(make_order("a", "1", OrderStatus::Pending)).unwrap();
        let dup = store.append(make_order("a", "2", OrderStatus::Pending));
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn find_active_for_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        store.append(make_order("old", "3", OrderStatus::Served)).unwrap();
        store.append(make_order("current", "3", OrderStatus::Pending)).unwrap();
        store.append(make_order("other", "5", OrderStatus::Preparing)).unwrap();

        assert_eq!(store.find_active_for_table("3").unwrap().id, "current");
        assert_eq!(store.find_active_for_table("5").unwrap().id, "other");
        assert!(store.find_active_for_table("9").is_none());
    }

    #[test]
    fn find_active_prefers_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        // Two concurrently active orders for one table should not happen per
        // intended usage, but the data model does not prevent it.
        store.append(make_order("first", "3", OrderStatus::Pending)).unwrap();
        store.append(make_order("second", "3", OrderStatus::Pending)).unwrap();

        assert_eq!(store.find_active_for_table("3").unwrap().id, "second");
    }

    #[test]
    fn find_active_none_after_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        store.append(make_order("a", "3", OrderStatus::Pending)).unwrap();
        store.update_status("a", OrderStatus::Cancelled).unwrap();
        assert!(store.find_active_for_table("3").is_none());

        store.append(make_order("b", "4", OrderStatus::Preparing)).unwrap();
        store.update_status("b", OrderStatus::Served).unwrap();
        assert!(store.find_active_for_table("4").is_none());
    }

    #[test]
    fn update_status_follows_transition_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        store.append(make_order("a", "1", OrderStatus::Pending)).unwrap();

        // Disallowed: pending -> served.
        assert!(store.update_status("a", OrderStatus::Served).unwrap().is_none());
        assert_eq!(store.get("a").unwrap().status, OrderStatus::Pending);

        // Allowed path.
        let updated = store.update_status("a", OrderStatus::Preparing).unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);
        let updated = store.update_status("a", OrderStatus::Served).unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Served);

        // Terminal states never retreat.
        assert!(store.update_status("a", OrderStatus::Preparing).unwrap().is_none());
        assert!(store.update_status("a", OrderStatus::Cancelled).unwrap().is_none());
    }

    #[test]
    fn update_status_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::open(test_kv(&dir)).unwrap();

        assert!(store
            .update_status("ghost", OrderStatus::Preparing)
            .unwrap()
            .is_none());
    }

    #[test]
    fn reload_reproduces_identical_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let kv = test_kv(&dir);

        let store = OrderStore::open(Arc::clone(&kv)).unwrap();
        store.append(make_order("a", "1", OrderStatus::Pending)).unwrap();
        store.append(make_order("b", "2", OrderStatus::Pending)).unwrap();
        store.update_status("a", OrderStatus::Preparing).unwrap();
        let before = store.list_all();

        let reopened = OrderStore::open(kv).unwrap();
        assert_eq!(reopened.list_all(), before);
    }

    #[test]
    fn corrupt_blob_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = test_kv(&dir);
        kv.set("orders:all", b"<<garbage>>").unwrap();

        let store = OrderStore::open(kv).unwrap();
        assert!(store.list_all().is_empty());
    }
}
