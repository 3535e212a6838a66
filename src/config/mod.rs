use crate::models::{GarbageCanSpot, ItemCatalog, LootTables, ModConfig, StorageData};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

/// Prefix for environment overrides, e.g. `CHESTKEEPER_SEARCH_TAG_SYMBOL=@`.
pub const ENV_PREFIX: &str = "CHESTKEEPER";

/// Configuration manager for loading and saving YAML data files.
///
/// Manages the files in the data directory (e.g. `ChestKeeper Data`):
/// - `ChestKeeper Config.yaml`: Main settings, default storage and default tabs
/// - `Storages.yaml`: Storage and tab definitions
/// - `Loot.yaml`: Garbage can loot tables
/// - `Items.yaml`: The item catalog loot is resolved against
/// - `Garbage Cans.yaml`: Where the garbage cans are
///
/// Every file is optional; a missing file loads as its defaults.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    mod_config_path: Utf8PathBuf,
    storages_path: Utf8PathBuf,
    loot_path: Utf8PathBuf,
    items_path: Utf8PathBuf,
    garbage_cans_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified data directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            mod_config_path: config_dir.join("ChestKeeper Config.yaml"),
            storages_path: config_dir.join("Storages.yaml"),
            loot_path: config_dir.join("Loot.yaml"),
            items_path: config_dir.join("Items.yaml"),
            garbage_cans_path: config_dir.join("Garbage Cans.yaml"),
            config_dir,
        })
    }

    /// Load the main settings, then apply `CHESTKEEPER_*` environment overrides.
    pub fn load_mod_config(&self) -> Result<ModConfig> {
        let overrides = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read environment overrides")?;

        self.load_mod_config_with(&overrides)
    }

    /// Load the main settings and apply overrides from `overrides`.
    pub fn load_mod_config_with(&self, overrides: &config::Config) -> Result<ModConfig> {
        let mut config: ModConfig = self.load_yaml(&self.mod_config_path, "mod config")?;
        let applied = apply_overrides(&mut config, overrides);
        if applied > 0 {
            tracing::info!("Applied {} config override(s)", applied);
        }
        Ok(config)
    }

    pub fn save_mod_config(&self, config: &ModConfig) -> Result<()> {
        self.save_yaml(&self.mod_config_path, "mod config", config)
    }

    /// Load storage and tab definitions.
    ///
    /// Storages fill anything they leave unset from `defaults`.
    pub fn load_storage_data(&self, defaults: &ModConfig) -> Result<StorageData> {
        let mut data: StorageData = self.load_yaml(&self.storages_path, "storage data")?;
        for storage in data.storages.values_mut() {
            storage.merge_defaults(&defaults.default_storage);
        }
        Ok(data)
    }

    pub fn save_storage_data(&self, data: &StorageData) -> Result<()> {
        self.save_yaml(&self.storages_path, "storage data", data)
    }

    pub fn load_loot_tables(&self) -> Result<LootTables> {
        self.load_yaml(&self.loot_path, "loot tables")
    }

    pub fn save_loot_tables(&self, tables: &LootTables) -> Result<()> {
        self.save_yaml(&self.loot_path, "loot tables", tables)
    }

    pub fn load_item_catalog(&self) -> Result<ItemCatalog> {
        self.load_yaml(&self.items_path, "item catalog")
    }

    pub fn save_item_catalog(&self, catalog: &ItemCatalog) -> Result<()> {
        self.save_yaml(&self.items_path, "item catalog", catalog)
    }

    pub fn load_garbage_cans(&self) -> Result<Vec<GarbageCanSpot>> {
        self.load_yaml(&self.garbage_cans_path, "garbage cans")
    }

    pub fn save_garbage_cans(&self, cans: &[GarbageCanSpot]) -> Result<()> {
        self.save_yaml(&self.garbage_cans_path, "garbage cans", cans)
    }

    fn load_yaml<T: DeserializeOwned + Default>(&self, path: &Utf8Path, label: &str) -> Result<T> {
        if !path.exists() {
            tracing::warn!("{} file not found at {}, using defaults", label, path);
            return Ok(T::default());
        }

        let file_contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}: {}", label, path))?;

        let value: T = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse {}: {}", label, path))?;

        tracing::info!("Loaded {} from {}", label, path);
        Ok(value)
    }

    fn save_yaml<T: Serialize + ?Sized>(&self, path: &Utf8Path, label: &str, value: &T) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(value)
            .with_context(|| format!("Failed to serialize {} to YAML", label))?;

        fs::write(path, yaml_string).with_context(|| format!("Failed to write {}: {}", label, path))?;

        tracing::info!("Saved {} to {}", label, path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Apply the known override keys to `config`. Returns how many were applied.
///
/// Nested keys use dots (`garbage.collection_day`); from the environment
/// that is `CHESTKEEPER_GARBAGE__COLLECTION_DAY`.
pub fn apply_overrides(config: &mut ModConfig, overrides: &config::Config) -> usize {
    let mut applied = 0;
    applied += override_field(overrides, "vacuum_to_first_row", &mut config.vacuum_to_first_row) as usize;
    applied += override_field(overrides, "expand_inventory_menu", &mut config.expand_inventory_menu) as usize;
    applied += override_field(overrides, "search_tag_symbol", &mut config.search_tag_symbol) as usize;
    applied += override_field(overrides, "garbage.collection_day", &mut config.garbage.collection_day) as usize;
    applied += override_field(overrides, "garbage.seasonal_chance", &mut config.garbage.seasonal_chance) as usize;
    applied += override_field(overrides, "default_storage.capacity", &mut config.default_storage.capacity) as usize;
    applied
}

fn override_field<T>(overrides: &config::Config, key: &str, field: &mut T) -> bool
where
    T: DeserializeOwned + std::fmt::Debug,
{
    match overrides.get::<T>(key) {
        Ok(value) => {
            tracing::info!("Config override {} = {:?}", key, value);
            *field = value;
            true
        }
        Err(config::ConfigError::NotFound(_)) => false,
        Err(e) => {
            tracing::warn!("Ignoring config override {}: {}", key, e);
            false
        }
    }
}
