use indexmap::IndexSet;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Default stack limit for items that don't declare one.
pub const DEFAULT_MAX_STACK: u32 = 999;

/// Tag query capability the rule engines need from an item.
///
/// Hosts with their own item representation implement this instead of
/// converting everything into [`Item`].
pub trait Tagged {
    /// Whether the item carries the given context tag.
    fn has_tag(&self, tag: &str) -> bool;

    /// Name shown to the player, used by name searches.
    fn display_name(&self) -> &str {
        ""
    }
}

/// A concrete item with a set of descriptive tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_stack")]
    pub stack: u32,

    #[serde(default = "default_max_stack")]
    pub max_stack: u32,

    #[serde(default)]
    pub tags: IndexSet<String>,
}

fn default_stack() -> u32 {
    1
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

impl Item {
    /// Create a single item with no tags.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stack: 1,
            max_stack: DEFAULT_MAX_STACK,
            tags: IndexSet::new(),
        }
    }

    /// Builder-style helper for attaching tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_stack(mut self, stack: u32) -> Self {
        self.stack = stack;
        self
    }

    /// Two items stack when they are the same kind of thing.
    pub fn can_stack_with(&self, other: &Item) -> bool {
        self.id == other.id && self.name == other.name && self.max_stack > 1
    }

    /// Merge as much of `other` into this stack as fits.
    ///
    /// Returns the amount that did not fit.
    pub fn add_to_stack(&mut self, amount: u32) -> u32 {
        let room = self.max_stack.saturating_sub(self.stack);
        let moved = room.min(amount);
        self.stack += moved;
        amount - moved
    }
}

impl Tagged for Item {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn has_tag(&self, tag: &str) -> bool {
        (**self).has_tag(tag)
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }
}

/// Every item the host knows about, in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by its id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Create a fresh item by id, falling back to a bare untagged item for
    /// ids the catalog doesn't list.
    pub fn create(&self, id: &str) -> Item {
        self.get(id)
            .cloned()
            .map(|item| item.with_stack(1))
            .unwrap_or_else(|| Item::new(id, id))
    }

    /// Pick a random item carrying `tag`.
    ///
    /// Matches are shuffled with `rng` and the first one wins, so ties are
    /// broken by the shuffle rather than catalog order.
    pub fn resolve<R: Rng + ?Sized>(&self, tag: &str, rng: &mut R) -> Option<&Item> {
        let mut matches: Vec<&Item> = self.items.iter().filter(|item| item.has_tag(tag)).collect();
        matches.shuffle(rng);
        matches.into_iter().next()
    }
}
