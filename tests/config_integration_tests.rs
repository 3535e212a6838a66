//! Integration tests for ConfigManager and data file handling
//!
//! These tests verify:
//! - Loading every data file with defaults when missing
//! - Save/load of hand-edited and generated files
//! - Rejection of invalid capacities
//! - Feeding loaded data into the StorageRegistry

use camino::Utf8PathBuf;
use chestkeeper::models::{
    Capacity, GarbageCanSpot, Item, ItemCatalog, LootEntry, LootTable, LootTables, ModConfig,
};
use chestkeeper::{ConfigManager, StorageRegistry};
use std::fs;
use tempfile::TempDir;
use tokio_test::assert_ok;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

fn no_overrides() -> config::Config {
    config::Config::builder().build().unwrap()
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
}

#[test]
fn test_creates_missing_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("ChestKeeper Data");

    assert_ok!(ConfigManager::new(&nested));
    assert!(nested.is_dir());
}

#[test]
fn test_load_default_mod_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let config = manager.load_mod_config_with(&no_overrides()).unwrap();

    assert!(config.vacuum_to_first_row);
    assert!(config.expand_inventory_menu);
    assert_eq!(config.search_tag_symbol, "#");
    assert_eq!(config.default_tabs.len(), 8);
    assert_eq!(config.garbage.collection_day, 0);
    assert_eq!(config.garbage.seasonal_chance, 0.1);
}

#[test]
fn test_hand_written_mod_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("ChestKeeper Config.yaml"),
        r#"
search_tag_symbol: "@"
default_storage:
  capacity: -1
  block_list: [category_junk]
garbage:
  seasonal_chance: 0.25
"#,
    )
    .unwrap();

    let manager = ConfigManager::new(&config_path).unwrap();
    let config = manager.load_mod_config_with(&no_overrides()).unwrap();

    assert_eq!(config.search_tag_symbol, "@");
    assert_eq!(config.default_storage.capacity, Capacity::Unlimited);
    assert!(config.default_storage.rules.block_list.contains("category_junk"));
    assert_eq!(config.garbage.seasonal_chance, 0.25);
    assert_eq!(config.garbage.collection_day, 0);
    // untouched sections keep their defaults
    assert_eq!(config.default_tabs.len(), 8);
}

#[test]
fn test_save_and_load_loot_tables() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut tables = LootTables {
        global: LootTable::new(vec![
            LootEntry::new("category_junk", 10.0),
            LootEntry::new("category_gem", 0.5),
        ]),
        ..LootTables::default()
    };
    tables
        .local
        .insert("Saloon".to_string(), LootTable::new(vec![LootEntry::new("category_cooking", 1.0)]));

    assert_ok!(manager.save_loot_tables(&tables));
    let loaded = manager.load_loot_tables().unwrap();

    assert_eq!(loaded, tables);
    assert_eq!(loaded.global.entries()[0].key, "category_junk");
}

#[test]
fn test_save_and_load_catalog_and_cans() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let catalog = ItemCatalog::new(vec![
        Item::new("168", "Trash").with_tags(["category_junk"]),
        Item::new("60", "Emerald").with_tags(["category_gem", "color_green"]),
    ]);
    let cans = vec![GarbageCanSpot {
        id: "Saloon".to_string(),
        location: "Town".to_string(),
        tile: (47, 70),
        luck_bonus: 0.1,
    }];

    assert_ok!(manager.save_item_catalog(&catalog));
    assert_ok!(manager.save_garbage_cans(&cans));

    assert_eq!(manager.load_item_catalog().unwrap(), catalog);
    assert_eq!(manager.load_garbage_cans().unwrap(), cans);
}

#[test]
fn test_invalid_yaml_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(config_path.join("Loot.yaml"), "global: [not, a, map").unwrap();

    let manager = ConfigManager::new(&config_path).unwrap();
    let err = manager.load_loot_tables().unwrap_err();
    assert!(format!("{:#}", err).contains("Loot.yaml"));
}

#[test]
fn test_negative_capacity_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("Storages.yaml"),
        "storages:\n  Broken Box:\n    capacity: -2\n",
    )
    .unwrap();

    let manager = ConfigManager::new(&config_path).unwrap();
    assert!(manager.load_storage_data(&ModConfig::default()).is_err());
}

#[test]
fn test_loaded_storages_feed_registry() {
    let (_temp_dir, config_path) = create_test_config_dir();
    fs::write(
        config_path.join("Storages.yaml"),
        r#"
mod_unique_id: author.Bins
storages:
  Fish Barrel:
    capacity: 72
    allow_list: [category_fish]
    tabs: [Fishing]
    vacuum_items: true
tabs:
  Fishing:
    icon: Barrel.png
    allow_list: [category_fish, category_bait]
"#,
    )
    .unwrap();

    let manager = ConfigManager::new(&config_path).unwrap();
    let config = manager.load_mod_config_with(&no_overrides()).unwrap();
    let data = manager.load_storage_data(&config).unwrap();

    let registry = StorageRegistry::new();
    registry.reload(&config, &[data]);

    let barrel = registry.require("Fish Barrel").unwrap();
    assert_eq!(barrel.capacity, Capacity::Slots(72));
    assert_eq!(barrel.mod_unique_id, "author.Bins");
    assert!(barrel.vacuum_items);

    let tabs = registry.tabs_for(&barrel);
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].icon, "Barrel.png");

    let carp = Item::new("142", "Carp").with_tags(["category_fish"]);
    assert!(registry.admits("Fish Barrel", &carp));
}
