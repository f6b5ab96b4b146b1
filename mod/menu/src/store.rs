use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use tably_core::{merge_patch, new_id, ServiceError};
use tably_kv::KVStore;

use crate::model::{Category, MenuItem, RestaurantData};

/// KV key holding the full menu/restaurant configuration blob.
const MENU_KEY: &str = "menu:config";

/// Read-only view of the menu catalog consumed by order creation.
pub trait Catalog: Send + Sync {
    /// Look up a menu item by id. `None` when the item no longer exists.
    fn find_item(&self, id: &str) -> Result<Option<MenuItem>, ServiceError>;
}

/// Persistent storage for the restaurant configuration.
///
/// The whole configuration is one JSON blob under `menu:config`; every
/// mutation rewrites the blob in a single atomic commit, so a reload
/// recovers exactly the last-committed state.
pub struct MenuStore {
    kv: Arc<dyn KVStore>,
    data: RwLock<RestaurantData>,
}

impl MenuStore {
    /// Open the store, seeding the starter dataset on first run.
    ///
    /// An unparsable persisted blob degrades to the starter dataset with a
    /// logged warning — never a crash.
    pub fn open(kv: Arc<dyn KVStore>) -> Result<Arc<Self>, ServiceError> {
        let data = match kv.get(MENU_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<RestaurantData>(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    warn!("menu blob unparsable ({e}), falling back to starter dataset");
                    RestaurantData::starter()
                }
            },
            Ok(None) => {
                info!("no menu configuration found, installing starter dataset");
                RestaurantData::starter()
            }
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };

        let store = Self {
            kv,
            data: RwLock::new(data),
        };
        {
            let data = store.data.read().expect("menu lock poisoned");
            store.persist(&data)?;
        }
        Ok(Arc::new(store))
    }

    /// Snapshot of the full configuration.
    pub fn get(&self) -> RestaurantData {
        self.data.read().expect("menu lock poisoned").clone()
    }

    /// Replace the whole configuration (editor save).
    pub fn replace(&self, new_data: RestaurantData) -> Result<RestaurantData, ServiceError> {
        let mut data = self.data.write().expect("menu lock poisoned");
        *data = new_data;
        self.persist(&data)?;
        Ok(data.clone())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Add a menu item. A blank id gets a fresh one assigned.
    pub fn add_item(&self, mut item: MenuItem) -> Result<MenuItem, ServiceError> {
        if item.id.is_empty() {
            item.id = new_id();
        }

        let mut data = self.data.write().expect("menu lock poisoned");
        if data.find_item(&item.id).is_some() {
            return Err(ServiceError::Conflict(format!(
                "menu item '{}' already exists",
                item.id
            )));
        }
        data.items.push(item.clone());
        self.persist(&data)?;
        Ok(item)
    }

    /// Patch a menu item (RFC 7386 merge). The id cannot be changed.
    pub fn update_item(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<MenuItem, ServiceError> {
        let mut data = self.data.write().expect("menu lock poisoned");
        let pos = data
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("menu item '{id}'")))?;

        let mut updated: MenuItem = apply_patch(&data.items[pos], patch)?;
        updated.id = id.to_string();
        data.items[pos] = updated.clone();
        self.persist(&data)?;
        Ok(updated)
    }

    /// Remove a menu item.
    pub fn remove_item(&self, id: &str) -> Result<(), ServiceError> {
        let mut data = self.data.write().expect("menu lock poisoned");
        let before = data.items.len();
        data.items.retain(|i| i.id != id);
        if data.items.len() == before {
            return Err(ServiceError::NotFound(format!("menu item '{id}'")));
        }
        self.persist(&data)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Add a category. A blank id gets a fresh one assigned.
    pub fn add_category(&self, mut category: Category) -> Result<Category, ServiceError> {
        if category.id.is_empty() {
            category.id = new_id();
        }

        let mut data = self.data.write().expect("menu lock poisoned");
        if data.find_category(&category.id).is_some() {
            return Err(ServiceError::Conflict(format!(
                "category '{}' already exists",
                category.id
            )));
        }
        data.categories.push(category.clone());
        self.persist(&data)?;
        Ok(category)
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// Add a table label. Labels are kept sorted numerically where possible.
    pub fn add_table(&self, label: &str) -> Result<Vec<String>, ServiceError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ServiceError::Validation("table label is empty".into()));
        }

        let mut data = self.data.write().expect("menu lock poisoned");
        if data.tables.iter().any(|t| t == label) {
            return Err(ServiceError::Conflict(format!(
                "table '{label}' already exists"
            )));
        }
        data.tables.push(label.to_string());
        data.tables
            .sort_by_key(|t| (t.parse::<u64>().unwrap_or(u64::MAX), t.clone()));
        self.persist(&data)?;
        Ok(data.tables.clone())
    }

    /// Remove a table label. Past orders for the table are untouched.
    pub fn remove_table(&self, label: &str) -> Result<Vec<String>, ServiceError> {
        let mut data = self.data.write().expect("menu lock poisoned");
        let before = data.tables.len();
        data.tables.retain(|t| t != label);
        if data.tables.len() == before {
            return Err(ServiceError::NotFound(format!("table '{label}'")));
        }
        self.persist(&data)?;
        Ok(data.tables.clone())
    }

    // -----------------------------------------------------------------------

    /// Commit the full configuration snapshot.
    fn persist(&self, data: &RestaurantData) -> Result<(), ServiceError> {
        let bytes =
            serde_json::to_vec(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv
            .set(MENU_KEY, &bytes)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

impl Catalog for MenuStore {
    fn find_item(&self, id: &str) -> Result<Option<MenuItem>, ServiceError> {
        let data = self.data.read().expect("menu lock poisoned");
        Ok(data.find_item(id).cloned())
    }
}

/// Apply an RFC 7386 merge patch to a serializable record.
fn apply_patch<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: serde_json::Value,
) -> Result<T, ServiceError> {
    let mut value =
        serde_json::to_value(current).map_err(|e| ServiceError::Internal(e.to_string()))?;
    merge_patch(&mut value, &patch);
    serde_json::from_value(value)
        .map_err(|e| ServiceError::Validation(format!("invalid patch: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Translatable;
    use tably_kv::RedbStore;

    fn test_kv(dir: &tempfile::TempDir) -> Arc<dyn KVStore> {
        Arc::new(RedbStore::open(&dir.path().join("kv.redb")).unwrap())
    }

    fn make_item(id: &str, name: &str, price: i64) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: Translatable::new(name, name, name),
            description: Translatable::default(),
            price,
            image: None,
            category: "lunch".into(),
            is_available: true,
            tags: Vec::new(),
            prep_time_minutes: None,
        }
    }

    #[test]
    fn seeds_starter_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();
        assert_eq!(store.get(), RestaurantData::starter());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let kv = test_kv(&dir);

        let store = MenuStore::open(Arc::clone(&kv)).unwrap();
        store.add_item(make_item("plov", "Osh", 38000)).unwrap();
        let saved = store.get();

        let reopened = MenuStore::open(kv).unwrap();
        assert_eq!(reopened.get(), saved);
    }

    #[test]
    fn corrupt_blob_falls_back_to_starter() {
        let dir = tempfile::tempdir().unwrap();
        let kv = test_kv(&dir);
        kv.set("menu:config", b"{not json").unwrap();

        let store = MenuStore::open(kv).unwrap();
        assert_eq!(store.get(), RestaurantData::starter());
    }

    #[test]
    fn add_item_assigns_id_and_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();

        let created = store.add_item(make_item("", "Lagman", 42000)).unwrap();
        assert!(!created.id.is_empty());

        let dup = store.add_item(make_item(&created.id, "Lagman", 42000));
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn update_item_merges_patch() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();

        let updated = store
            .update_item(
                "1",
                serde_json::json!({"price": 50000, "name": {"en": "Avocado Toast Deluxe"}}),
            )
            .unwrap();
        assert_eq!(updated.price, 50000);
        assert_eq!(updated.name.en, "Avocado Toast Deluxe");
        // Untouched locale survives the merge.
        assert_eq!(updated.name.uz, "Klassik Avokado Toast");

        let missing = store.update_item("nope", serde_json::json!({"price": 1}));
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn patch_cannot_change_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();

        let updated = store
            .update_item("1", serde_json::json!({"id": "evil"}))
            .unwrap();
        assert_eq!(updated.id, "1");
    }

    #[test]
    fn remove_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();

        store.remove_item("1").unwrap();
        assert!(store.get().items.is_empty());
        assert!(matches!(
            store.remove_item("1"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn tables_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();

        store.add_table("12").unwrap();
        let tables = store.add_table("4").unwrap();
        assert_eq!(tables, vec!["1", "2", "3", "4", "12"]);

        assert!(matches!(
            store.add_table("4"),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            store.add_table("  "),
            Err(ServiceError::Validation(_))
        ));

        let tables = store.remove_table("12").unwrap();
        assert_eq!(tables, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn catalog_find_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(test_kv(&dir)).unwrap();
        let catalog: &dyn Catalog = store.as_ref();

        assert!(catalog.find_item("1").unwrap().is_some());
        assert!(catalog.find_item("ghost").unwrap().is_none());
    }
}
