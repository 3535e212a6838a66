// Carrying placed storages and vacuuming items into them

use crate::models::item::{Item, Tagged};
use crate::models::storage::{StorageConfig, StoreError};
use crate::state::StorageRegistry;

/// Slots in the first inventory row.
pub const FIRST_ROW_SLOTS: usize = 12;

/// A placed storage picked up into an inventory, contents and all.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageItem {
    /// The item the storage was placed from
    pub item: Item,
    pub config: StorageConfig,
    pub contents: Vec<Item>,
}

impl StorageItem {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Empty storages of the same kind stack like ordinary items.
    pub fn can_stack_with(&self, other: &StorageItem) -> bool {
        self.name() == other.name() && self.is_empty() && other.is_empty() && self.item.stack < self.item.max_stack
    }

    /// Put `item` inside, topping up existing stacks before taking a new slot.
    ///
    /// Returns whatever did not fit, or `None` when everything went in.
    pub fn deposit(&mut self, mut item: Item, host_default: usize) -> Option<Item> {
        for existing in self.contents.iter_mut() {
            if !existing.can_stack_with(&item) {
                continue;
            }
            item.stack = existing.add_to_stack(item.stack);
            if item.stack == 0 {
                return None;
            }
        }

        let has_room = self
            .config
            .effective_capacity(host_default)
            .is_none_or(|capacity| self.contents.len() < capacity);
        if has_room {
            self.contents.push(item);
            None
        } else {
            Some(item)
        }
    }
}

/// Turn a placed storage back into something that fits in an inventory.
///
/// Uses the registered config for the item's name, or `supplied` when the
/// registry has none. Fails when neither is available.
pub fn to_storage(
    item: &Item,
    registry: &StorageRegistry,
    supplied: Option<&StorageConfig>,
) -> Result<StorageItem, StoreError> {
    let config = match registry.get(&item.name) {
        Some(config) => config,
        None => supplied
            .cloned()
            .ok_or_else(|| StoreError::UnknownStorage(item.name.clone()))?,
    };

    Ok(StorageItem {
        item: item.clone(),
        config,
        contents: Vec::new(),
    })
}

/// One inventory slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Carried {
    Item(Item),
    Storage(StorageItem),
}

impl Tagged for Carried {
    fn has_tag(&self, tag: &str) -> bool {
        match self {
            Carried::Item(item) => item.has_tag(tag),
            Carried::Storage(storage) => storage.item.has_tag(tag),
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Carried::Item(item) => &item.name,
            Carried::Storage(storage) => &storage.item.name,
        }
    }
}

/// The player's inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backpack {
    slots: Vec<Option<Carried>>,
}

impl Backpack {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn slots(&self) -> &[Option<Carried>] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Carried storages in slot order, with their slot index
    pub fn storages(&self) -> impl Iterator<Item = (usize, &StorageItem)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            Some(Carried::Storage(storage)) => Some((index, storage)),
            _ => None,
        })
    }

    /// Open the carried storage in `index` without placing it.
    ///
    /// Only storages marked `access_carried` open this way, and a stack of
    /// storages never does.
    pub fn open_carried(&mut self, index: usize) -> Option<&mut StorageItem> {
        match self.slots.get_mut(index)? {
            Some(Carried::Storage(storage)) if storage.config.access_carried && storage.item.stack <= 1 => {
                Some(storage)
            }
            _ => None,
        }
    }

    fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Pick a placed storage up. Storages that can't be carried are refused.
    ///
    /// Returns the storage back when it was refused or there was no room.
    pub fn pick_up(&mut self, storage: StorageItem) -> Option<StorageItem> {
        if !storage.config.can_carry {
            tracing::debug!("{} can't be carried", storage.name());
            return Some(storage);
        }
        self.add_storage(storage)
    }

    /// Add a storage to the inventory.
    ///
    /// Stacks onto empty storages of the same kind first, up to their stack
    /// limit, then puts the rest in the first empty slot. Returns whatever is
    /// left when neither works.
    pub fn add_storage(&mut self, mut storage: StorageItem) -> Option<StorageItem> {
        storage.item.stack = storage.item.stack.max(1);
        for slot in self.slots.iter_mut().flatten() {
            if let Carried::Storage(existing) = slot {
                if existing.can_stack_with(&storage) {
                    storage.item.stack = existing.item.add_to_stack(storage.item.stack);
                    if storage.item.stack == 0 {
                        return None;
                    }
                }
            }
        }

        match self.first_empty() {
            Some(index) => {
                self.slots[index] = Some(Carried::Storage(storage));
                None
            }
            None => Some(storage),
        }
    }

    /// Add a plain item, stacking first.
    pub fn add_item(&mut self, mut item: Item) -> Option<Item> {
        for slot in self.slots.iter_mut().flatten() {
            if let Carried::Item(existing) = slot {
                if existing.can_stack_with(&item) {
                    item.stack = existing.add_to_stack(item.stack);
                    if item.stack == 0 {
                        return None;
                    }
                }
            }
        }

        match self.first_empty() {
            Some(index) => {
                self.slots[index] = Some(Carried::Item(item));
                None
            }
            None => Some(item),
        }
    }

    /// Take whatever is in `index` out of the inventory.
    pub fn take(&mut self, index: usize) -> Option<Carried> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Route a picked-up item into carried storages that vacuum.
    ///
    /// Storages are tried in slot order; with `first_row_only` only the first
    /// [`FIRST_ROW_SLOTS`] slots are searched. A storage takes the item when it
    /// vacuums, admits the item and has room. Stacked storages are skipped.
    /// Returns what is left for the regular inventory.
    pub fn vacuum(&mut self, item: Item, first_row_only: bool, host_default: usize) -> Option<Item> {
        let limit = if first_row_only {
            FIRST_ROW_SLOTS
        } else {
            self.slots.len()
        };

        let mut remaining = item;
        for slot in self.slots.iter_mut().take(limit).flatten() {
            let Carried::Storage(storage) = slot else {
                continue;
            };
            if !storage.config.vacuum_items || storage.item.stack > 1 || !storage.config.admits(&remaining) {
                continue;
            }

            let stack = remaining.stack;
            match storage.deposit(remaining, host_default) {
                None => {
                    tracing::trace!("Vacuumed {} into {}", stack, storage.name());
                    return None;
                }
                Some(leftover) => remaining = leftover,
            }
        }

        Some(remaining)
    }
}
