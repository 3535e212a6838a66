//! Integration tests for tab filtering, search and menu paging
//!
//! These tests verify:
//! - Filtering with no tab is the identity
//! - Filtering keeps the original order
//! - Scroll offsets never leave their bounds
//! - The active tab is always one of the session's tabs

use chestkeeper::models::{Item, Tab, default_tabs};
use chestkeeper::services::{MenuSession, ScrollDirection, filter, search};
use proptest::prelude::*;

const TAGS: &[&str] = &[
    "category_seeds",
    "category_fish",
    "category_junk",
    "category_gem",
    "category_cooking",
];

fn arb_item() -> impl Strategy<Value = Item> {
    (0u32..10_000, proptest::sample::subsequence(TAGS, 0..=3)).prop_map(|(id, tags)| {
        Item::new(id.to_string(), format!("Item {}", id)).with_tags(tags.into_iter().map(str::to_string))
    })
}

fn arb_tab() -> impl Strategy<Value = Tab> {
    (
        proptest::sample::subsequence(TAGS, 0..=2),
        proptest::sample::subsequence(TAGS, 0..=1),
    )
        .prop_map(|(allow, block)| {
            let mut tab = Tab::new("Generated", "", allow);
            tab.rules.block_list.extend(block.into_iter().map(str::to_string));
            tab
        })
}

fn fishing_tab() -> Tab {
    default_tabs()["Fishing"].clone()
}

proptest! {
    #[test]
    fn filter_without_tab_is_identity(items in proptest::collection::vec(arb_item(), 0..50)) {
        let filtered = filter(&items, None);
        prop_assert_eq!(filtered.len(), items.len());
        for (kept, original) in filtered.iter().zip(&items) {
            prop_assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn filter_is_stable_and_sound(items in proptest::collection::vec(arb_item(), 0..50), tab in arb_tab()) {
        let filtered = filter(&items, Some(&tab));

        // Every kept item matches, every dropped item doesn't
        let expected: Vec<&Item> = items.iter().filter(|item| tab.matches(*item)).collect();
        prop_assert_eq!(filtered.len(), expected.len());
        for (kept, wanted) in filtered.iter().zip(&expected) {
            prop_assert!(std::ptr::eq(*kept, *wanted));
        }
    }

    #[test]
    fn scroll_offset_stays_in_bounds(
        len in 0usize..120,
        columns in 1usize..13,
        rows in 1usize..5,
        moves in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let items: Vec<Item> = (0..len).map(|i| Item::new(i.to_string(), "Stone")).collect();
        let visible = columns * rows;
        let mut session = MenuSession::new(Vec::new(), columns, visible);
        session.refresh(&items);

        let rounded = len.div_ceil(columns) * columns;
        let max_offset = rounded.saturating_sub(visible);

        for down in moves {
            let direction = if down { ScrollDirection::Down } else { ScrollDirection::Up };
            let before = session.offset();
            let moved = session.scroll(direction);

            prop_assert!(session.offset() <= max_offset);
            prop_assert_eq!(session.offset() % columns, 0);
            if !moved {
                prop_assert_eq!(session.offset(), before);
            }
            prop_assert!(session.visible_items(&items).len() <= len);
        }
    }

    #[test]
    fn active_tab_always_in_list(names in proptest::collection::vec("[A-Za-z]{0,8}", 0..10)) {
        let tabs: Vec<Tab> = default_tabs().into_values().collect();
        let items: Vec<Item> = Vec::new();
        let mut session = MenuSession::new(tabs.clone(), 4, 8);

        for name in &names {
            session.set_tab(Some(name.as_str()), &items);
            if let Some(active) = session.active_tab() {
                prop_assert!(tabs.iter().any(|tab| tab.name == active.name));
            }
            session.next_tab(&items);
            if let Some(active) = session.active_tab() {
                prop_assert!(tabs.contains(active));
            }
        }
    }
}

#[test]
fn test_window_scenario() {
    // 10 items in a 4 column, 8 slot window: one row hidden
    let items: Vec<Item> = (0..10)
        .map(|i| {
            let tag = if i < 3 { "category_fish" } else { "category_junk" };
            Item::new(i.to_string(), format!("Item {}", i)).with_tags([tag])
        })
        .collect();

    let mut session = MenuSession::new(vec![fishing_tab()], 4, 8);
    session.refresh(&items);
    assert!(session.can_scroll_down());
    assert!(!session.can_scroll_up());

    session.set_tab(Some("Fishing"), &items);
    assert_eq!(session.filtered_len(), 3);
    assert!(!session.can_scroll_down());
}

#[test]
fn test_tab_cycle_passes_through_none() {
    let items: Vec<Item> = Vec::new();
    let tabs: Vec<Tab> = default_tabs().into_values().take(2).collect();
    let mut session = MenuSession::new(tabs, 4, 8);

    let mut seen = Vec::new();
    for _ in 0..4 {
        session.next_tab(&items);
        seen.push(session.active_tab().map(|tab| tab.name.clone()));
    }
    assert_eq!(
        seen,
        vec![
            Some("Clothing".to_string()),
            Some("Cooking".to_string()),
            None,
            Some("Clothing".to_string()),
        ]
    );

    session.previous_tab(&items);
    assert_eq!(session.active_tab(), None);
}

#[test]
fn test_search_by_name_and_tag() {
    let items = vec![
        Item::new("472", "Parsnip Seeds").with_tags(["category_seeds"]),
        Item::new("24", "Parsnip").with_tags(["category_vegetable"]),
        Item::new("142", "Carp").with_tags(["category_fish"]),
    ];

    let by_name: Vec<&str> = search(&items, "PARSNIP", "#").into_iter().map(|i| i.id.as_str()).collect();
    assert_eq!(by_name, vec!["472", "24"]);

    let by_tag: Vec<&str> = search(&items, "#category_fish", "#").into_iter().map(|i| i.id.as_str()).collect();
    assert_eq!(by_tag, vec!["142"]);

    assert_eq!(search(&items, "  ", "#").len(), 3);
}
