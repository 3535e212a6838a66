//! Data models for ChestKeeper.
//!
//! This module contains the plain data structures shared by every service:
//! - [`Item`] / [`ItemCatalog`]: Tagged items and the global item repository
//! - [`StorageConfig`] / [`Tab`]: Per-storage admission rules and browsing tabs
//! - [`LootTable`] / [`LootTables`]: Weighted tag tables for garbage can loot
//! - [`ModConfig`]: Settings loaded from `ChestKeeper Config.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: Config structs derive `Serialize`/`Deserialize` for YAML persistence
//! - **Host-agnostic**: Rule checks are generic over [`Tagged`], so hosts can pass their own items
//! - **Immutable after load**: Storages and tabs live in [`StorageRegistry`](crate::state::StorageRegistry)
//!   and are only replaced wholesale on reload

pub mod config;
pub mod item;
pub mod loot;
pub mod storage;

pub use config::{GarbageCanSpot, GarbageConfig, ModConfig, StorageData, default_tabs};
pub use item::{DEFAULT_MAX_STACK, Item, ItemCatalog, Tagged};
pub use loot::{LootEntry, LootTable, LootTables};
pub use storage::{
    Capacity, HOST_DEFAULT_CAPACITY, StorageConfig, StoreError, Tab, TagRules, qualify_tab,
};
