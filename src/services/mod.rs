//! Services module - Rule evaluation for storages, menus and garbage cans.
//!
//! Everything here is synchronous and host-agnostic. Hosts call these
//! functions from their own event handlers; nothing hooks into the host.
//!
//! # Components
//!
//! - [`tabs`]: The tab rule engine. Handles:
//!   - Filtering an item list by the active [`Tab`](crate::models::Tab)
//!   - Name and `#tag` search queries
//!   - Paging through a storage menu one row at a time ([`MenuSession`])
//!
//! - [`garbage`]: Daily garbage can state machine ([`GarbageCan`]). Each can
//!   rolls a [`RewardTier`] from its own seeded stream at day start and hands
//!   the reward out when opened. Host state is read through [`World`].
//!
//! - [`carry`]: Picking placed storages back up ([`to_storage`]) and routing
//!   picked-up items into carried storages ([`Backpack::vacuum`]).
//!
//! # Usage Example
//!
//! ```ignore
//! use chestkeeper::services::{GarbageCan, LootEnvironment, MenuSession, WorldSnapshot};
//!
//! // Storage menu
//! let storage = registry.config_or_default("Chest");
//! let mut session = MenuSession::for_storage(&storage, registry.tabs_for(&storage), 12, 36);
//! session.set_tab(Some("Crops"), &items);
//! let shown = session.visible_items(&items);
//!
//! // New day
//! let env = LootEnvironment { catalog: &catalog, tables: &loot, config: &config.garbage };
//! let tier = can.day_start(&world, &env, &mut rng);
//! ```

pub mod carry;
pub mod garbage;
pub mod tabs;

pub use carry::{Backpack, Carried, FIRST_ROW_SLOTS, StorageItem, to_storage};
pub use garbage::{
    CanState, Delivery, GarbageCan, LidColor, LootEnvironment, OpenOutcome, RewardTier, World,
    WorldSnapshot, daily_seed, lid_color_for, roll_tier, seeded_rng,
};
pub use tabs::{MenuSession, ScrollDirection, SearchQuery, filter, search};
