//! Tab filtering, searching and paging for storage menus.
//!
//! [`filter`] and [`search`] are pure functions over any [`Tagged`] items.
//! [`MenuSession`] holds the per-menu browsing state (active tab, scroll
//! offset) that a host keeps alive while a storage menu is open.

use crate::models::item::Tagged;
use crate::models::storage::{StorageConfig, Tab};

/// Keep the items an optional tab accepts, in their original order.
///
/// With no active tab every item is returned.
pub fn filter<'a, T: Tagged>(items: &'a [T], tab: Option<&Tab>) -> Vec<&'a T> {
    match tab {
        None => items.iter().collect(),
        Some(tab) => items
            .iter()
            .filter(|item| tab.is_allowed(*item) && !tab.is_blocked(*item))
            .collect(),
    }
}

/// A parsed search-bar query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Matches everything
    Any,
    /// Items carrying this exact tag
    Tag(String),
    /// Items whose name contains this text, ignoring case
    Name(String),
}

impl SearchQuery {
    /// Parse raw search text; a leading `symbol` searches by tag.
    pub fn parse(text: &str, symbol: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return SearchQuery::Any;
        }

        match text.strip_prefix(symbol) {
            Some(tag) if !symbol.is_empty() => {
                let tag = tag.trim();
                if tag.is_empty() {
                    SearchQuery::Any
                } else {
                    SearchQuery::Tag(tag.to_string())
                }
            }
            _ => SearchQuery::Name(text.to_lowercase()),
        }
    }

    pub fn matches<T: Tagged + ?Sized>(&self, item: &T) -> bool {
        match self {
            SearchQuery::Any => true,
            SearchQuery::Tag(tag) => item.has_tag(tag),
            SearchQuery::Name(needle) => item.display_name().to_lowercase().contains(needle),
        }
    }
}

/// Keep the items matching a search-bar query, in their original order.
pub fn search<'a, T: Tagged>(items: &'a [T], text: &str, symbol: &str) -> Vec<&'a T> {
    let query = SearchQuery::parse(text, symbol);
    items.iter().filter(|item| query.matches(*item)).collect()
}

/// Which way a scroll input moves the item grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Mouse-wheel convention: positive delta scrolls up.
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(ScrollDirection::Up),
            -1 => Some(ScrollDirection::Down),
            _ => None,
        }
    }
}

/// Round `count` up to a whole number of rows.
fn round_up(count: usize, columns: usize) -> usize {
    count.div_ceil(columns) * columns
}

/// Browsing state for one open storage menu.
///
/// The active tab is always `None` or an index into `tabs`.
#[derive(Debug, Clone)]
pub struct MenuSession {
    tabs: Vec<Tab>,
    active: Option<usize>,
    columns: usize,
    visible: usize,
    offset: usize,
    filtered: usize,
    query: SearchQuery,
    search_bar: bool,
}

impl MenuSession {
    /// A session showing `visible` slots laid out in `columns` columns.
    pub fn new(tabs: Vec<Tab>, columns: usize, visible: usize) -> Self {
        let columns = columns.max(1);
        Self {
            tabs,
            active: None,
            columns,
            visible: visible.max(columns),
            offset: 0,
            filtered: 0,
            query: SearchQuery::Any,
            search_bar: true,
        }
    }

    /// A session for `storage`, honouring its search bar setting.
    pub fn for_storage(storage: &StorageConfig, tabs: Vec<Tab>, columns: usize, visible: usize) -> Self {
        Self {
            search_bar: storage.show_search_bar,
            ..Self::new(tabs, columns, visible)
        }
    }

    pub fn has_search_bar(&self) -> bool {
        self.search_bar
    }

    /// Carry tab and offset over from a previous session on the same storage.
    pub fn resume_from(&mut self, previous: &MenuSession) {
        self.active = previous
            .active_tab()
            .and_then(|tab| self.tabs.iter().position(|t| t.name == tab.name));
        self.offset = previous.offset;
        self.query = previous.query.clone();
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered
    }

    fn max_offset(&self) -> usize {
        round_up(self.filtered, self.columns).saturating_sub(self.visible)
    }

    pub fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.offset + self.columns + self.visible <= round_up(self.filtered, self.columns)
    }

    /// Move one row. Returns whether the offset changed.
    pub fn scroll(&mut self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Up if self.can_scroll_up() => {
                self.offset = self.offset.saturating_sub(self.columns);
            }
            ScrollDirection::Down if self.can_scroll_down() => {
                self.offset += self.columns;
            }
            _ => return false,
        }
        tracing::trace!("Menu scrolled {:?} to offset {}", direction, self.offset);
        true
    }

    /// Items passing the active tab and search query, in original order.
    pub fn filtered<'a, T: Tagged>(&self, items: &'a [T]) -> Vec<&'a T> {
        filter(items, self.active_tab())
            .into_iter()
            .filter(|item| self.query.matches(*item))
            .collect()
    }

    /// Recount filtered items and clamp the offset into range.
    pub fn refresh<T: Tagged>(&mut self, items: &[T]) {
        self.filtered = self.filtered(items).len();
        self.offset = self.offset.min(self.max_offset());
    }

    /// The filtered items starting at the current offset.
    pub fn visible_items<'a, T: Tagged>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.filtered(items).into_iter().skip(self.offset).collect()
    }

    /// Switch tab by name and return to the top.
    ///
    /// `None` or a name not in this session's tab list clears the filter.
    pub fn set_tab<T: Tagged>(&mut self, name: Option<&str>, items: &[T]) {
        self.active = name.and_then(|name| self.tabs.iter().position(|tab| tab.name == name));
        self.offset = 0;
        self.refresh(items);
    }

    /// Cycle forward; past the last tab the filter is cleared.
    pub fn next_tab<T: Tagged>(&mut self, items: &[T]) {
        self.active = match self.active {
            None if !self.tabs.is_empty() => Some(0),
            Some(index) if index + 1 < self.tabs.len() => Some(index + 1),
            _ => None,
        };
        self.offset = 0;
        self.refresh(items);
    }

    /// Cycle backward; before the first tab the filter is cleared.
    pub fn previous_tab<T: Tagged>(&mut self, items: &[T]) {
        self.active = match self.active {
            None if !self.tabs.is_empty() => Some(self.tabs.len() - 1),
            Some(index) if index > 0 => Some(index - 1),
            _ => None,
        };
        self.offset = 0;
        self.refresh(items);
    }

    /// Apply search-bar text; a leading `symbol` searches by tag.
    ///
    /// Returns false, leaving the view alone, when the storage hides its
    /// search bar.
    pub fn set_search<T: Tagged>(&mut self, text: &str, symbol: &str, items: &[T]) -> bool {
        if !self.search_bar {
            tracing::trace!("Search bar hidden, ignoring query {:?}", text);
            return false;
        }
        self.query = SearchQuery::parse(text, symbol);
        self.offset = 0;
        self.refresh(items);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::Item;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                let tag = if i % 3 == 0 { "category_fish" } else { "category_junk" };
                Item::new(i.to_string(), format!("Item {}", i)).with_tags([tag])
            })
            .collect()
    }

    fn fishing() -> Tab {
        Tab::new("Fishing", "Fish.png", ["category_fish"])
    }

    #[test]
    fn test_filter_without_tab_is_identity() {
        let items = items(5);
        let filtered = filter(&items, None);
        assert_eq!(filtered.len(), 5);
        assert!(filtered.iter().zip(&items).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_filter_is_stable() {
        let items = items(10);
        let tab = fishing();
        let ids: Vec<&str> = filter(&items, Some(&tab)).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "3", "6", "9"]);
    }

    #[test]
    fn test_search_query_parse() {
        assert_eq!(SearchQuery::parse("  ", "#"), SearchQuery::Any);
        assert_eq!(SearchQuery::parse("#category_fish", "#"), SearchQuery::Tag("category_fish".into()));
        assert_eq!(SearchQuery::parse("Carp", "#"), SearchQuery::Name("carp".into()));
        assert_eq!(SearchQuery::parse("#", "#"), SearchQuery::Any);
    }

    #[test]
    fn test_search_by_name_and_tag() {
        let items = vec![
            Item::new("142", "Carp").with_tags(["category_fish"]),
            Item::new("128", "Pufferfish").with_tags(["category_fish"]),
            Item::new("388", "Wood"),
        ];

        let by_name: Vec<&str> = search(&items, "FISH", "#").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(by_name, vec!["128"]);

        let by_tag = search(&items, "#category_fish", "#");
        assert_eq!(by_tag.len(), 2);
    }

    #[test]
    fn test_scroll_down_window() {
        // 24-slot storage shown through a 4 column, 8 slot window
        let all = items(10);
        let mut session = MenuSession::new(vec![fishing()], 4, 8);
        session.refresh(&all);
        assert!(session.can_scroll_down());

        session.set_tab(Some("Fishing"), &all);
        // 4 fish left, fits in the window
        assert!(!session.can_scroll_down());
    }

    #[test]
    fn test_scroll_is_noop_at_boundaries() {
        let all = items(20);
        let mut session = MenuSession::new(Vec::new(), 4, 8);
        session.refresh(&all);

        assert!(!session.scroll(ScrollDirection::Up));
        assert_eq!(session.offset(), 0);

        assert!(session.scroll(ScrollDirection::Down));
        assert!(session.scroll(ScrollDirection::Down));
        assert!(session.scroll(ScrollDirection::Down));
        assert_eq!(session.offset(), 12);
        assert!(!session.scroll(ScrollDirection::Down));
        assert_eq!(session.offset(), 12);

        assert_eq!(session.visible_items(&all).len(), 8);
    }

    #[test]
    fn test_refresh_clamps_offset() {
        let mut all = items(20);
        let mut session = MenuSession::new(Vec::new(), 4, 8);
        session.refresh(&all);
        while session.scroll(ScrollDirection::Down) {}
        assert_eq!(session.offset(), 12);

        all.truncate(10);
        session.refresh(&all);
        assert_eq!(session.offset(), 4);
    }

    #[test]
    fn test_unknown_tab_clears_filter() {
        let all = items(6);
        let mut session = MenuSession::new(vec![fishing()], 4, 8);
        session.set_tab(Some("Fishing"), &all);
        assert!(session.active_tab().is_some());

        session.set_tab(Some("Gardening"), &all);
        assert!(session.active_tab().is_none());
        assert_eq!(session.filtered_len(), 6);
    }

    #[test]
    fn test_tab_cycling() {
        let all = items(6);
        let tabs = vec![fishing(), Tab::new("Misc", "Misc.png", ["category_junk"])];
        let mut session = MenuSession::new(tabs, 4, 8);

        session.next_tab(&all);
        assert_eq!(session.active_tab().map(|t| t.name.as_str()), Some("Fishing"));
        session.next_tab(&all);
        assert_eq!(session.active_tab().map(|t| t.name.as_str()), Some("Misc"));
        session.next_tab(&all);
        assert!(session.active_tab().is_none());

        session.previous_tab(&all);
        assert_eq!(session.active_tab().map(|t| t.name.as_str()), Some("Misc"));
    }

    #[test]
    fn test_resume_from_previous_session() {
        let all = items(30);
        let mut first = MenuSession::new(Vec::new(), 4, 8);
        first.refresh(&all);
        first.scroll(ScrollDirection::Down);

        let mut second = MenuSession::new(Vec::new(), 4, 8);
        second.resume_from(&first);
        second.refresh(&all);
        assert_eq!(second.offset(), 4);
    }

    #[test]
    fn test_set_search_filters_and_resets_offset() {
        let all = items(20);
        let mut session = MenuSession::new(Vec::new(), 4, 8);
        session.refresh(&all);
        session.scroll(ScrollDirection::Down);

        assert!(session.set_search("#category_fish", "#", &all));
        assert_eq!(session.offset(), 0);
        assert_eq!(session.filtered_len(), 7);
    }

    #[test]
    fn test_hidden_search_bar_ignores_queries() {
        let all = items(20);
        let mut storage = StorageConfig::new("Barrel");
        storage.show_search_bar = false;
        let mut session = MenuSession::for_storage(&storage, Vec::new(), 4, 8);
        session.refresh(&all);
        assert!(!session.has_search_bar());

        assert!(!session.set_search("#category_fish", "#", &all));
        assert_eq!(session.filtered_len(), 20);
    }

    #[test]
    fn test_scroll_direction_from_delta() {
        assert_eq!(ScrollDirection::from_delta(120), Some(ScrollDirection::Up));
        assert_eq!(ScrollDirection::from_delta(-120), Some(ScrollDirection::Down));
        assert_eq!(ScrollDirection::from_delta(0), None);
    }
}
