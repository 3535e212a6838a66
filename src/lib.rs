// ChestKeeper - Storage rules, tabbed menus and daily garbage can loot
//
// This is the library crate containing the rule engines and data structures.
// The binary crate (main.rs) is a small composition root that loads a data
// directory and simulates a week of garbage days.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{Item, ItemCatalog, LootTable, LootTables, ModConfig, StorageConfig, Tab, Tagged};
pub use state::{RegistryChange, StorageRegistry};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
