use crate::models::item::Tagged;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slot count the host gives a storage when its config says "default" (`0`).
pub const HOST_DEFAULT_CAPACITY: usize = 36;

/// Errors raised by storage configuration and conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No storage configuration registered for {0}")]
    UnknownStorage(String),

    #[error("Invalid storage capacity {0} (use -1 for unlimited, 0 for the host default)")]
    InvalidCapacity(i32),
}

/// How many item slots a storage holds.
///
/// Serialized as a plain integer: `-1` is unlimited, `0` defers to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Capacity {
    Unlimited,
    #[default]
    HostDefault,
    Slots(u32),
}

impl TryFrom<i32> for Capacity {
    type Error = StoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Capacity::Unlimited),
            0 => Ok(Capacity::HostDefault),
            n if n > 0 => Ok(Capacity::Slots(n as u32)),
            n => Err(StoreError::InvalidCapacity(n)),
        }
    }
}

impl From<Capacity> for i32 {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Unlimited => -1,
            Capacity::HostDefault => 0,
            Capacity::Slots(n) => n.min(i32::MAX as u32) as i32,
        }
    }
}

impl Capacity {
    /// Resolve to a concrete slot limit; `None` means unbounded.
    pub fn resolve(self, host_default: usize) -> Option<usize> {
        match self {
            Capacity::Unlimited => None,
            Capacity::HostDefault => Some(host_default),
            Capacity::Slots(n) => Some(n as usize),
        }
    }
}

/// Allow/block tag lists shared by storages and tabs.
///
/// An empty allow list allows everything; an empty block list blocks nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRules {
    #[serde(default)]
    pub allow_list: IndexSet<String>,

    #[serde(default)]
    pub block_list: IndexSet<String>,
}

impl TagRules {
    pub fn allowing<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: tags.into_iter().map(Into::into).collect(),
            block_list: IndexSet::new(),
        }
    }

    pub fn is_allowed<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.allow_list.is_empty() || self.allow_list.iter().any(|tag| item.has_tag(tag))
    }

    pub fn is_blocked<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        !self.block_list.is_empty() && self.block_list.iter().any(|tag| item.has_tag(tag))
    }

    /// Allowed and not blocked. Block rules win.
    pub fn admits<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.is_allowed(item) && !self.is_blocked(item)
    }

    pub fn is_empty(&self) -> bool {
        self.allow_list.is_empty() && self.block_list.is_empty()
    }
}

/// Rule set for one storage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub name: String,

    /// Mod that registered the storage; tab names are qualified by it.
    #[serde(default)]
    pub mod_unique_id: String,

    #[serde(default)]
    pub capacity: Capacity,

    #[serde(flatten)]
    pub rules: TagRules,

    #[serde(default)]
    pub tabs: Vec<String>,

    #[serde(default = "default_true")]
    pub can_carry: bool,

    /// Can be opened straight from the inventory while carried.
    #[serde(default)]
    pub access_carried: bool,

    /// Menus for this storage accept search-bar queries.
    #[serde(default = "default_true")]
    pub show_search_bar: bool,

    #[serde(default)]
    pub vacuum_items: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            mod_unique_id: String::new(),
            capacity: Capacity::HostDefault,
            rules: TagRules::default(),
            tabs: Vec::new(),
            can_carry: true,
            access_carried: false,
            show_search_bar: true,
            vacuum_items: false,
        }
    }
}

impl StorageConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy of `defaults` registered under a new name.
    ///
    /// Used for storages no content pack configured.
    pub fn from_defaults(name: impl Into<String>, defaults: &StorageConfig) -> Self {
        Self {
            name: name.into(),
            ..defaults.clone()
        }
    }

    /// Fill unset parts of this config from `defaults`.
    ///
    /// Capacity left at the host default, empty tag rules and an empty tab list
    /// are taken from `defaults`; everything else stays as configured.
    pub fn merge_defaults(&mut self, defaults: &StorageConfig) {
        if self.capacity == Capacity::HostDefault {
            self.capacity = defaults.capacity;
        }
        if self.rules.is_empty() {
            self.rules = defaults.rules.clone();
        }
        if self.tabs.is_empty() {
            self.tabs = defaults.tabs.clone();
        }
        if self.mod_unique_id.is_empty() {
            self.mod_unique_id = defaults.mod_unique_id.clone();
        }
    }

    pub fn is_allowed<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.is_allowed(item)
    }

    pub fn is_blocked<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.is_blocked(item)
    }

    /// Whether `item` may be inserted into this storage.
    pub fn admits<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.admits(item)
    }

    /// Slot limit for this storage; `None` is unbounded.
    pub fn effective_capacity(&self, host_default: usize) -> Option<usize> {
        self.capacity.resolve(host_default)
    }

    /// Tab keys qualified by the owning mod, e.g. `author.Mod/Crops`.
    pub fn qualified_tabs(&self) -> impl Iterator<Item = String> + '_ {
        self.tabs.iter().map(move |tab| qualify_tab(&self.mod_unique_id, tab))
    }
}

/// Registry key for a tab owned by `mod_unique_id`.
pub fn qualify_tab(mod_unique_id: &str, tab: &str) -> String {
    if mod_unique_id.is_empty() {
        tab.to_string()
    } else {
        format!("{}/{}", mod_unique_id, tab)
    }
}

/// A named filter for browsing a storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub name: String,

    /// Opaque icon reference handed back to the host.
    #[serde(default)]
    pub icon: String,

    #[serde(flatten)]
    pub rules: TagRules,
}

impl Tab {
    pub fn new<I, S>(name: impl Into<String>, icon: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            icon: icon.into(),
            rules: TagRules::allowing(tags),
        }
    }

    pub fn is_allowed<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.is_allowed(item)
    }

    pub fn is_blocked<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.is_blocked(item)
    }

    pub fn matches<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        self.rules.admits(item)
    }
}
