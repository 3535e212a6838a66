use crate::models::item::{Item, ItemCatalog};
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One weighted row of a loot table.
#[derive(Debug, Clone, PartialEq)]
pub struct LootEntry {
    /// Tag (or category) an item must carry to be picked for this row.
    pub key: String,
    pub weight: f64,
}

impl LootEntry {
    pub fn new(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            weight,
        }
    }
}

/// Ordered weighted mapping from tag keys to relative draw odds.
///
/// Stored on disk as an ordered `key: weight` map; order matters because
/// ties are broken positionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct LootTable {
    entries: Vec<LootEntry>,
}

impl From<IndexMap<String, f64>> for LootTable {
    fn from(map: IndexMap<String, f64>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, weight)| LootEntry { key, weight })
                .collect(),
        }
    }
}

impl From<LootTable> for IndexMap<String, f64> {
    fn from(table: LootTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|entry| (entry.key, entry.weight))
            .collect()
    }
}

impl FromIterator<LootEntry> for LootTable {
    fn from_iter<I: IntoIterator<Item = LootEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl LootTable {
    pub fn new(entries: Vec<LootEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LootEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the weights that can actually be drawn.
    pub fn total_weight(&self) -> f64 {
        self.entries
            .iter()
            .filter(|entry| entry.weight > 0.0)
            .map(|entry| entry.weight)
            .sum()
    }

    /// Draw one key at random, proportionally to its weight.
    ///
    /// The first entry whose running total reaches the target wins. Entries
    /// with a non-positive weight are never picked.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }

        let target = rng.r#gen::<f64>() * total;
        self.select(target)
    }

    /// Pick the entry for an already scaled target in `[0, total)`.
    pub fn select(&self, target: f64) -> Option<&str> {
        let mut cumulative = 0.0;
        for entry in &self.entries {
            if entry.weight <= 0.0 {
                continue;
            }
            cumulative += entry.weight;
            if cumulative < target {
                continue;
            }
            return Some(&entry.key);
        }
        None
    }

    /// Draw a key, then a random catalog item carrying it.
    pub fn roll<R: Rng + ?Sized>(&self, catalog: &ItemCatalog, rng: &mut R) -> Option<Item> {
        let key = self.draw(rng)?;
        let item = catalog.resolve(key, rng)?;
        tracing::debug!("Loot roll picked {} ({}) for key {}", item.name, item.id, key);
        Some(item.clone().with_stack(1))
    }
}

/// Custom loot for garbage cans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTables {
    /// Fallback table shared by every can.
    #[serde(default)]
    pub global: LootTable,

    /// Tables for individual cans, keyed by can id.
    #[serde(default)]
    pub local: IndexMap<String, LootTable>,
}

impl LootTables {
    pub fn local_for(&self, can_id: &str) -> Option<&LootTable> {
        self.local.get(can_id)
    }
}
