//! ChestKeeper - storage rules and garbage can loot
//!
//! Main entry point for the command line composition root.
//!
//! # Overview
//!
//! The library is normally driven by a game host. This binary wires the same
//! pieces together without one, which is handy for checking a data directory:
//! - Logging infrastructure (file rotation + console output)
//! - Configuration loading ([`ConfigManager`])
//! - The storage registry ([`StorageRegistry`]) and a change listener task
//! - A simulated week of garbage days against a [`WorldSnapshot`]
//!
//! # Execution Flow
//!
//! 1. Initialize logging → `ChestKeeper Data/logs/chestkeeper.<date>`
//! 2. Create a tokio runtime for the registry change listener
//! 3. Load YAML data from `ChestKeeper Data/`
//! 4. Reload the registry and log the configuration summary
//! 5. Run admission checks for every catalog item against every storage
//! 6. Simulate seven days: roll, open, vacuum loot into a carried storage
//! 7. Log the metrics summary
//!
//! # Configuration Files
//!
//! Expected in `ChestKeeper Data/` (all optional):
//! - `ChestKeeper Config.yaml`: Settings, default storage and default tabs
//! - `Storages.yaml`: Storage and tab definitions
//! - `Loot.yaml`: Global and per-can loot tables
//! - `Items.yaml`: Item catalog
//! - `Garbage Cans.yaml`: Can locations (vanilla town cans when missing)

use anyhow::Result;
use chestkeeper::config::ConfigManager;
use chestkeeper::models::{GarbageCanSpot, HOST_DEFAULT_CAPACITY, Item, ModConfig};
use chestkeeper::services::{
    Backpack, GarbageCan, LootEnvironment, WorldSnapshot, seeded_rng, to_storage,
};
use chestkeeper::{APP_NAME, Metrics, RegistryChange, StorageRegistry, VERSION};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

const DATA_DIR: &str = "ChestKeeper Data";
const SIMULATED_DAYS: u32 = 7;
const BACKPACK_SLOTS: usize = 36;

fn main() -> Result<()> {
    let _log_guard = chestkeeper::logging::setup_logging_with_console(
        &format!("{}/logs", DATA_DIR),
        "chestkeeper",
        false,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("chestkeeper-worker")
        .build()?;

    let metrics = Arc::new(Metrics::new());
    let registry = StorageRegistry::new();

    // Log registry changes the way an open menu would react to them
    let mut changes = registry.subscribe();
    let listener_metrics = Arc::clone(&metrics);
    let listener = runtime.spawn(async move {
        loop {
            match changes.recv().await {
                Ok(RegistryChange::Reloaded { storages, tabs }) => {
                    listener_metrics.record_reload();
                    tracing::debug!("Registry reloaded ({} storages, {} tabs)", storages, tabs);
                }
                Ok(change) => tracing::debug!("Registry change: {:?}", change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Registry listener skipped {} changes", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let config_manager = ConfigManager::new(DATA_DIR)?;
    let config = config_manager.load_mod_config()?;
    let storage_data = config_manager.load_storage_data(&config)?;
    let loot = config_manager.load_loot_tables()?;
    let catalog = config_manager.load_item_catalog()?;
    let mut spots = config_manager.load_garbage_cans()?;
    if spots.is_empty() {
        tracing::warn!("No garbage cans configured, using the town cans");
        spots = town_cans();
    }

    registry.reload(&config, std::slice::from_ref(&storage_data));
    for line in config.summary_report().lines() {
        tracing::info!("{}", line);
    }

    // Admission checks
    let storage_names: Vec<String> = registry.read(|s| s.storages.keys().cloned().collect());
    for name in &storage_names {
        for item in catalog.items() {
            metrics.record_admission(registry.admits(name, item));
        }
    }

    let mut backpack = carried_storages(&registry, &storage_names);

    let env = LootEnvironment {
        catalog: &catalog,
        tables: &loot,
        config: &config.garbage,
    };
    let mut cans: Vec<GarbageCan> = spots.iter().map(GarbageCan::from_spot).collect();
    let mut world = WorldSnapshot {
        game_seed: 0x00C0_FFEE,
        day_of_month: 1,
        ..WorldSnapshot::default()
    };
    let mut global_rng = seeded_rng(world.game_seed);

    for _ in 0..SIMULATED_DAYS {
        for can in &mut cans {
            let tier = can.day_start(&world, &env, &mut global_rng);
            metrics.record_reward(tier);

            let outcome = can.open();
            if outcome.newly_checked {
                world.trash_cans_checked += 1;
                metrics.record_can_checked();
            }
            if let Some(delivery) = &outcome.delivery {
                tracing::info!("Day {}: {} delivered {:?}", world.days_played, can.id(), delivery);
            }
            if outcome.opens_menu {
                for item in can.take_contents() {
                    stash(&mut backpack, item, &config, &metrics);
                }
            }
            can.close();
        }
        world.advance_day();
    }

    // Dropping the last sender ends the listener
    drop(registry);
    runtime.block_on(listener)?;
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    metrics.log_summary();
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Carry one of every storage that vacuums.
fn carried_storages(registry: &StorageRegistry, names: &[String]) -> Backpack {
    let mut backpack = Backpack::new(BACKPACK_SLOTS);
    for name in names {
        let placed = Item::new(name.as_str(), name.as_str());
        match to_storage(&placed, registry, None) {
            Ok(storage) if storage.config.vacuum_items => {
                if backpack.pick_up(storage).is_some() {
                    tracing::debug!("Left {} behind", name);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Can't carry {}: {}", name, e),
        }
    }
    backpack
}

/// Vacuum a looted item, falling back to a plain inventory slot.
fn stash(backpack: &mut Backpack, item: Item, config: &ModConfig, metrics: &Metrics) {
    let name = item.name.clone();
    match backpack.vacuum(item, config.vacuum_to_first_row, HOST_DEFAULT_CAPACITY) {
        None => metrics.record_vacuumed(),
        Some(leftover) => {
            if backpack.add_item(leftover).is_some() {
                tracing::info!("Inventory full, dropped {}", name);
            }
        }
    }
}

/// The vanilla town cans.
fn town_cans() -> Vec<GarbageCanSpot> {
    [
        (13, 86),
        (19, 89),
        (56, 85),
        (108, 91),
        (97, 80),
        (47, 70),
        (52, 63),
        (110, 56),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, tile)| GarbageCanSpot {
        id: index.to_string(),
        location: "Town".to_string(),
        tile,
        luck_bonus: 0.0,
    })
    .collect()
}
