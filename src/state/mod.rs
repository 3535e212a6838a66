// Storage registry module
//
// This module provides the StorageRegistry which owns every storage and tab
// configuration behind Arc<RwLock<T>> and emits change events when content is
// (re)loaded, so open menus can refresh.

use crate::models::item::Tagged;
use crate::models::storage::{StorageConfig, StoreError, Tab};
use crate::models::{ModConfig, StorageData};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the registry is modified
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryChange {
    /// All content was replaced
    Reloaded { storages: usize, tabs: usize },

    /// A single storage was added or replaced
    StorageRegistered { name: String },

    /// Defaults for unconfigured storages changed
    DefaultsChanged,

    /// Everything was removed
    Cleared,
}

/// Everything the registry knows at one point in time.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot {
    /// Configured storages keyed by storage name
    pub storages: IndexMap<String, StorageConfig>,

    /// Tabs keyed by qualified name (`mod.id/Tab`, or bare for defaults)
    pub tabs: IndexMap<String, Tab>,

    /// Applied to storages nobody configured
    pub defaults: StorageConfig,
}

/// Read-mostly store of storage configurations.
///
/// Written at load/reload time, read by every admission check and menu.
/// Readers never observe a half-applied reload: [`reload()`](Self::reload)
/// swaps the whole snapshot under one write lock.
///
/// # Related Types
///
/// - [`crate::config::ConfigManager`]: Loads the data fed into [`reload()`](Self::reload)
/// - [`crate::services::tabs::MenuSession`]: Consumes [`tabs_for()`](Self::tabs_for)
/// - [`crate::services::carry`]: Uses [`to_storage`](crate::services::carry::to_storage) lookups
pub struct StorageRegistry {
    snapshot: Arc<RwLock<RegistrySnapshot>>,

    /// Broadcast channel for emitting change events
    change_tx: broadcast::Sender<RegistryChange>,
}

impl StorageRegistry {
    /// Create an empty registry with a broadcast buffer of 100 events
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            snapshot: Arc::new(RwLock::new(RegistrySnapshot::default())),
            change_tx,
        }
    }

    /// Clone of the current contents
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.snapshot.read().unwrap().clone()
    }

    /// Execute a function with read access to the contents
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RegistrySnapshot) -> R,
    {
        let snapshot = self.snapshot.read().unwrap();
        f(&snapshot)
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryChange> {
        self.change_tx.subscribe()
    }

    fn emit(&self, change: RegistryChange) -> RegistryChange {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.change_tx.send(change.clone());
        change
    }

    /// Replace all content from the mod config and loaded storage data.
    ///
    /// Default tabs are registered under their bare names; content tabs under
    /// `mod_unique_id/name`. Storages without an owner inherit the content's
    /// `mod_unique_id`. Storages with a blank name are dropped.
    pub fn reload(&self, config: &ModConfig, data: &[StorageData]) -> RegistryChange {
        let mut next = RegistrySnapshot {
            defaults: config.default_storage.clone(),
            ..RegistrySnapshot::default()
        };

        for (name, tab) in &config.default_tabs {
            let mut tab = tab.clone();
            if tab.name.is_empty() {
                tab.name = name.clone();
            }
            next.tabs.insert(name.clone(), tab);
        }

        for content in data {
            for (name, tab) in &content.tabs {
                let mut tab = tab.clone();
                if tab.name.is_empty() {
                    tab.name = name.clone();
                }
                let key = crate::models::storage::qualify_tab(&content.mod_unique_id, name);
                next.tabs.insert(key, tab);
            }

            for (name, storage) in &content.storages {
                if name.trim().is_empty() {
                    tracing::warn!(
                        "Skipping unnamed storage from {}",
                        content.mod_unique_id
                    );
                    continue;
                }
                let mut storage = storage.clone();
                storage.name = name.clone();
                if storage.mod_unique_id.is_empty() {
                    storage.mod_unique_id = content.mod_unique_id.clone();
                }
                if next.storages.insert(name.clone(), storage).is_some() {
                    tracing::warn!("Storage {} was registered twice, keeping the last", name);
                }
            }
        }

        let (storages, tabs) = (next.storages.len(), next.tabs.len());
        *self.snapshot.write().unwrap() = next;

        tracing::info!(
            "Storage registry reloaded: {} storages, {} tabs",
            storages,
            tabs
        );

        let change = RegistryChange::Reloaded { storages, tabs };
        self.emit(change)
    }

    /// Add or replace a single storage
    pub fn register(&self, storage: StorageConfig) -> RegistryChange {
        let name = storage.name.clone();
        self.snapshot
            .write()
            .unwrap()
            .storages
            .insert(name.clone(), storage);
        tracing::debug!("Registered storage {}", name);
        self.emit(RegistryChange::StorageRegistered { name })
    }

    /// Replace the config used for unconfigured storages
    pub fn set_defaults(&self, defaults: StorageConfig) -> RegistryChange {
        self.snapshot.write().unwrap().defaults = defaults;
        self.emit(RegistryChange::DefaultsChanged)
    }

    /// Remove everything
    pub fn clear(&self) -> RegistryChange {
        *self.snapshot.write().unwrap() = RegistrySnapshot::default();
        self.emit(RegistryChange::Cleared)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read(|s| s.storages.contains_key(name))
    }

    /// The registered config for a storage, if any
    pub fn get(&self, name: &str) -> Option<StorageConfig> {
        self.read(|s| s.storages.get(name).cloned())
    }

    /// The registered config, or the defaults cascaded onto `name`
    pub fn config_or_default(&self, name: &str) -> StorageConfig {
        self.read(|s| match s.storages.get(name) {
            Some(storage) => storage.clone(),
            None => StorageConfig::from_defaults(name, &s.defaults),
        })
    }

    /// The registered config, failing loudly when there is none
    pub fn require(&self, name: &str) -> Result<StorageConfig, StoreError> {
        self.get(name)
            .ok_or_else(|| StoreError::UnknownStorage(name.to_string()))
    }

    /// Whether `item` may go into storage `name`.
    ///
    /// Storages with no registered config accept anything.
    pub fn admits<T: Tagged + ?Sized>(&self, name: &str, item: &T) -> bool {
        self.read(|s| s.storages.get(name).is_none_or(|storage| storage.admits(item)))
    }

    /// Resolve a storage's tab names to tabs, skipping names nobody registered
    pub fn tabs_for(&self, storage: &StorageConfig) -> Vec<Tab> {
        self.read(|s| {
            storage
                .tabs
                .iter()
                .filter_map(|name| {
                    let qualified = crate::models::storage::qualify_tab(&storage.mod_unique_id, name);
                    let tab = s.tabs.get(&qualified).or_else(|| s.tabs.get(name));
                    if tab.is_none() {
                        tracing::debug!("Tab {} for {} is not registered, skipping", qualified, storage.name);
                    }
                    tab.cloned()
                })
                .collect()
        })
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Cloning shares the same underlying store
impl Clone for StorageRegistry {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            change_tx: self.change_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::Item;
    use crate::models::storage::Capacity;

    fn seed_box() -> StorageConfig {
        let mut storage = StorageConfig::new("Seed Box");
        storage.rules.allow_list.insert("category_seeds".to_string());
        storage.tabs = vec!["Seeds".to_string(), "Missing".to_string(), "Crops".to_string()];
        storage
    }

    fn content() -> StorageData {
        let mut data = StorageData {
            mod_unique_id: "author.Storage".to_string(),
            ..StorageData::default()
        };
        data.storages.insert("Seed Box".to_string(), seed_box());
        data.tabs.insert(
            "Seeds".to_string(),
            Tab::new("", "Seeds.png", ["category_seeds"]),
        );
        data
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = StorageRegistry::new();
        let snapshot = registry.snapshot();
        assert!(snapshot.storages.is_empty());
        assert!(snapshot.tabs.is_empty());
    }

    #[test]
    fn test_reload_registers_content() {
        let registry = StorageRegistry::new();
        let change = registry.reload(&ModConfig::default(), &[content()]);

        assert_eq!(change, RegistryChange::Reloaded { storages: 1, tabs: 9 });

        let storage = registry.get("Seed Box").unwrap();
        assert_eq!(storage.mod_unique_id, "author.Storage");
        assert!(registry.read(|s| s.tabs.contains_key("author.Storage/Seeds")));
    }

    #[test]
    fn test_tabs_for_skips_unknown_and_falls_back_to_defaults() {
        let registry = StorageRegistry::new();
        registry.reload(&ModConfig::default(), &[content()]);

        let storage = registry.get("Seed Box").unwrap();
        let tabs = registry.tabs_for(&storage);
        let names: Vec<&str> = tabs.iter().map(|t| t.name.as_str()).collect();

        // "Seeds" resolves to the content tab, "Crops" to the default tab
        assert_eq!(names, vec!["Seeds", "Crops"]);
        assert_eq!(tabs[0].icon, "Seeds.png");
    }

    #[test]
    fn test_admits_unregistered_storage() {
        let registry = StorageRegistry::new();
        let wood = Item::new("388", "Wood");
        assert!(registry.admits("Chest", &wood));
    }

    #[test]
    fn test_admits_registered_storage() {
        let registry = StorageRegistry::new();
        registry.register(seed_box());

        let wood = Item::new("388", "Wood");
        let seeds = Item::new("472", "Parsnip Seeds").with_tags(["category_seeds"]);
        assert!(!registry.admits("Seed Box", &wood));
        assert!(registry.admits("Seed Box", &seeds));
    }

    #[test]
    fn test_require_fails_for_unknown() {
        let registry = StorageRegistry::new();
        assert_eq!(
            registry.require("Mystery Box"),
            Err(StoreError::UnknownStorage("Mystery Box".to_string()))
        );
    }

    #[test]
    fn test_config_or_default_cascades() {
        let registry = StorageRegistry::new();
        let mut defaults = StorageConfig::default();
        defaults.capacity = Capacity::Slots(48);
        registry.set_defaults(defaults);

        let storage = registry.config_or_default("Chest");
        assert_eq!(storage.name, "Chest");
        assert_eq!(storage.capacity, Capacity::Slots(48));
    }

    #[test]
    fn test_subscribe_to_changes() {
        let registry = StorageRegistry::new();
        let mut rx = registry.subscribe();

        registry.register(seed_box());

        let event = rx.try_recv();
        assert!(matches!(
            event,
            Ok(RegistryChange::StorageRegistered { ref name }) if name == "Seed Box"
        ));
    }

    #[test]
    fn test_clone_shares_store() {
        let first = StorageRegistry::new();
        let second = first.clone();

        first.register(seed_box());
        assert!(second.contains("Seed Box"));

        second.clear();
        assert!(!first.contains("Seed Box"));
    }
}
