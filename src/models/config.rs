use crate::models::storage::{StorageConfig, Tab};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Main settings from `ChestKeeper Config.yaml`.
///
/// Every field has a default so a partial (or missing) file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    /// Only vacuum into storages in the first row of the player inventory.
    pub vacuum_to_first_row: bool,

    /// Adds three extra rows to the inventory menu.
    pub expand_inventory_menu: bool,

    /// Prefix that turns a search query into a tag search.
    pub search_tag_symbol: String,

    /// Config applied to storages nobody configured.
    pub default_storage: StorageConfig,

    /// Tabs offered to storages nobody configured.
    pub default_tabs: IndexMap<String, Tab>,

    pub garbage: GarbageConfig,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            vacuum_to_first_row: true,
            expand_inventory_menu: true,
            search_tag_symbol: "#".to_string(),
            default_storage: StorageConfig::default(),
            default_tabs: default_tabs(),
            garbage: GarbageConfig::default(),
        }
    }
}

impl ModConfig {
    /// Human readable settings dump for the log.
    pub fn summary_report(&self) -> String {
        format!(
            "ChestKeeper Configuration\n\
             \tResize Menu        : {}\n\
             \tSearch Tag Symbol  : {}\n\
             \tVacuum First Row   : {}\n\
             \tDefault Capacity   : {}\n\
             \tDefault Tabs       : {}\n\
             \tCollection Day     : {}\n\
             \tSeasonal Chance    : {}",
            self.expand_inventory_menu,
            self.search_tag_symbol,
            self.vacuum_to_first_row,
            i32::from(self.default_storage.capacity),
            self.default_tabs.keys().cloned().collect::<Vec<_>>().join(", "),
            self.garbage.collection_day,
            self.garbage.seasonal_chance,
        )
    }

    /// Replace every setting with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &ModConfig) {
        self.vacuum_to_first_row = other.vacuum_to_first_row;
        self.expand_inventory_menu = other.expand_inventory_menu;
        self.search_tag_symbol = other.search_tag_symbol.clone();
        self.default_storage = other.default_storage.clone();
        self.default_tabs.clear();
        for (name, tab) in &other.default_tabs {
            self.default_tabs.insert(name.clone(), tab.clone());
        }
        self.garbage = other.garbage.clone();
    }
}

/// Garbage can settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarbageConfig {
    /// Cans are emptied when `day_of_month % 7` equals this.
    pub collection_day: u32,

    /// Chance of falling back to the host's seasonal item.
    pub seasonal_chance: f64,
}

impl Default for GarbageConfig {
    fn default() -> Self {
        Self {
            collection_day: 0,
            seasonal_chance: 0.1,
        }
    }
}

/// Storages and tabs contributed by one content source (`Storages.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageData {
    pub mod_unique_id: String,
    pub storages: IndexMap<String, StorageConfig>,
    pub tabs: IndexMap<String, Tab>,
}

/// Where a garbage can sits in the world (`Garbage Cans.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbageCanSpot {
    /// Can id; vanilla cans use their number ("0".."7").
    pub id: String,
    pub location: String,
    pub tile: (i32, i32),

    /// Extra luck added by the location.
    #[serde(default)]
    pub luck_bonus: f64,
}

/// The built-in tab set offered to unconfigured storages.
pub fn default_tabs() -> IndexMap<String, Tab> {
    let tabs = [
        Tab::new(
            "Clothing",
            "Shirts.png",
            ["category_clothing", "category_boots", "category_hat"],
        ),
        Tab::new(
            "Cooking",
            "Cooking.png",
            [
                "category_syrup",
                "category_artisan_goods",
                "category_ingredients",
                "category_sell_at_pierres_and_marnies",
                "category_sell_at_pierres",
                "category_meat",
                "category_cooking",
                "category_milk",
                "category_egg",
            ],
        ),
        Tab::new(
            "Crops",
            "Crops.png",
            [
                "category_greens",
                "category_flowers",
                "category_fruits",
                "category_vegetable",
            ],
        ),
        Tab::new(
            "Equipment",
            "Tools.png",
            [
                "category_equipment",
                "category_ring",
                "category_tool",
                "category_weapon",
            ],
        ),
        Tab::new(
            "Fishing",
            "Fish.png",
            [
                "category_bait",
                "category_fish",
                "category_tackle",
                "category_sell_at_fish_shop",
            ],
        ),
        Tab::new(
            "Materials",
            "Minerals.png",
            [
                "category_monster_loot",
                "category_metal_resources",
                "category_building_resources",
                "category_minerals",
                "category_crafting",
                "category_gem",
            ],
        ),
        Tab::new(
            "Misc",
            "Misc.png",
            ["category_big_craftable", "category_furniture", "category_junk"],
        ),
        Tab::new("Seeds", "Seeds.png", ["category_seeds", "category_fertilizer"]),
    ];

    tabs.into_iter().map(|tab| (tab.name.clone(), tab)).collect()
}
