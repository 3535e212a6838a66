//! Daily garbage can rewards.
//!
//! Each [`GarbageCan`] is reset by the host at the start of every day, rolls a
//! [`RewardTier`] from a deterministic per-day stream, and hands out its reward
//! when the player opens it. Host state the roll depends on (luck, lifetime
//! counters, special orders, ...) is read through the [`World`] trait.
//!
//! # Roll order
//!
//! 1. Mega and double-mega rolls, both drawn once the lifetime checked count
//!    passes [`MEGA_MIN_CHECKED`]. Mega wins a tie.
//! 2. Base chance `0.2 + daily luck + location luck` (skipped on a mega).
//! 3. Qi bean override from the host's shared rng.
//! 4. Loot fallbacks: vanilla per-can items, the can's own weighted table, the
//!    host's seasonal item, the global weighted table.

use crate::models::config::{GarbageCanSpot, GarbageConfig};
use crate::models::item::{Item, ItemCatalog, Tagged};
use crate::models::loot::LootTables;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Lifetime cans checked before mega rewards can happen (exclusive).
pub const MEGA_MIN_CHECKED: u32 = 20;
pub const MEGA_CHANCE: f64 = 0.01;
pub const DOUBLE_MEGA_CHANCE: f64 = 0.002;
pub const BASE_CHANCE: f64 = 0.2;

/// Special order rule that makes cans drop Qi beans.
pub const QI_BEANS_RULE: &str = "DROP_QI_BEANS";
pub const QI_BEANS_ID: &str = "890";
pub const GARBAGE_HAT_ID: &str = "66";

const PREWARM_MAX: u32 = 100;
const JOJA_COLA_EVENT: u32 = 191393;

/// Host state read while rolling rewards.
#[cfg_attr(test, mockall::automock)]
pub trait World {
    /// Unique id of the save file.
    fn game_seed(&self) -> u64;
    fn days_played(&self) -> u32;
    fn day_of_month(&self) -> u32;
    fn daily_luck(&self) -> f64;
    /// Lifetime number of garbage cans the player has checked.
    fn trash_cans_checked(&self) -> u32;
    fn special_order_active(&self, rule: &str) -> bool;
    fn dish_of_the_day(&self) -> Option<String>;
    fn has_seen_event(&self, event_id: u32) -> bool;
    fn has_mail(&self, flag: &str) -> bool;
    /// A random item for the current season, seeded by the caller.
    fn seasonal_item(&self, seed: i64) -> Option<String>;
}

/// Plain-data [`World`] for hosts that prefer to pass a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub game_seed: u64,
    pub days_played: u32,
    pub day_of_month: u32,
    pub daily_luck: f64,
    pub trash_cans_checked: u32,
    pub special_orders: Vec<String>,
    pub dish_of_the_day: Option<String>,
    pub seen_events: Vec<u32>,
    pub mail: Vec<String>,
    pub seasonal_items: Vec<String>,
}

impl WorldSnapshot {
    /// Move to the next day, wrapping the 28 day month.
    pub fn advance_day(&mut self) {
        self.days_played += 1;
        self.day_of_month = self.day_of_month % 28 + 1;
    }
}

impl World for WorldSnapshot {
    fn game_seed(&self) -> u64 {
        self.game_seed
    }

    fn days_played(&self) -> u32 {
        self.days_played
    }

    fn day_of_month(&self) -> u32 {
        self.day_of_month
    }

    fn daily_luck(&self) -> f64 {
        self.daily_luck
    }

    fn trash_cans_checked(&self) -> u32 {
        self.trash_cans_checked
    }

    fn special_order_active(&self, rule: &str) -> bool {
        self.special_orders.iter().any(|r| r == rule)
    }

    fn dish_of_the_day(&self) -> Option<String> {
        self.dish_of_the_day.clone()
    }

    fn has_seen_event(&self, event_id: u32) -> bool {
        self.seen_events.contains(&event_id)
    }

    fn has_mail(&self, flag: &str) -> bool {
        self.mail.iter().any(|m| m == flag)
    }

    fn seasonal_item(&self, seed: i64) -> Option<String> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        self.seasonal_items.choose(&mut rng).cloned()
    }
}

/// Loot sources shared by every can.
#[derive(Debug, Clone, Copy)]
pub struct LootEnvironment<'a> {
    pub catalog: &'a ItemCatalog,
    pub tables: &'a LootTables,
    pub config: &'a GarbageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanState {
    Unchecked,
    Checked,
}

/// Size of today's reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum RewardTier {
    #[default]
    None,
    Common,
    QiBeans,
    Mega,
    DoubleMega,
}

/// Reward handed out when the can is opened rather than left inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Dropped on the ground; the menu stays closed
    QiBeans(Item),
    /// Given straight to the player; the lid blows off
    GarbageHat(Item),
    /// Contents open with a fanfare
    MegaFanfare,
}

/// What happened when the player opened a can.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOutcome {
    /// First open today; the host bumps its lifetime counter
    pub newly_checked: bool,
    /// Whether the host should show the can's contents
    pub opens_menu: bool,
    pub delivery: Option<Delivery>,
}

/// Tint of the can lid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LidColor {
    DarkGray,
    /// Lid blown off by a double-mega reward
    Removed,
    DarkRed,
    DarkViolet,
    DarkBlue,
    DarkGreen,
    Brown,
    Yellow,
    Aquamarine,
    Purple,
    DarkCyan,
    Gray,
    Pink,
    DarkOrange,
}

const COLOR_TAGS: &[(&[&str], LidColor)] = &[
    (&["color_red", "color_dark_red"], LidColor::DarkRed),
    (&["color_pale_violet_red"], LidColor::DarkViolet),
    (&["color_blue"], LidColor::DarkBlue),
    (&["color_green", "color_dark_green", "color_jade"], LidColor::DarkGreen),
    (&["color_brown", "color_dark_brown"], LidColor::Brown),
    (&["color_yellow", "color_dark_yellow"], LidColor::Yellow),
    (&["color_aquamarine"], LidColor::Aquamarine),
    (&["color_purple", "color_dark_purple"], LidColor::Purple),
    (&["color_cyan"], LidColor::DarkCyan),
    (&["color_white", "color_gray"], LidColor::Gray),
    (&["color_pink"], LidColor::Pink),
    (&["color_orange"], LidColor::DarkOrange),
];

/// Lid tint for a can holding `items`.
///
/// Items are visited in shuffled order; the first one with a colour tag
/// decides. Falls back to gray.
pub fn lid_color_for<T: Tagged, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> LidColor {
    let mut shuffled: Vec<&T> = items.iter().collect();
    shuffled.shuffle(rng);

    for item in shuffled {
        for (tags, color) in COLOR_TAGS {
            if tags.iter().any(|tag| item.has_tag(tag)) {
                return *color;
            }
        }
    }
    LidColor::Gray
}

/// Seed for one can on one day.
///
/// Wrapping arithmetic keeps huge save ids from overflowing.
pub fn daily_seed(game_seed: u64, days_played: u32, can_number: i32) -> u64 {
    ((game_seed / 2) as i64)
        .wrapping_add(days_played as i64)
        .wrapping_add(777)
        .wrapping_add((can_number as i64).wrapping_mul(77)) as u64
}

/// Deterministic stream for `seed`, with two rounds of discarded draws so
/// neighbouring seeds don't start out correlated.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..2 {
        let prewarm = rng.gen_range(0..PREWARM_MAX);
        for _ in 0..prewarm {
            rng.r#gen::<f64>();
        }
    }
    rng
}

/// Roll today's tier from a can's stream.
///
/// Once the player has checked more than [`MEGA_MIN_CHECKED`] cans both the
/// mega and double-mega rolls are drawn; a mega hit takes precedence. Without
/// a mega the base roll decides between [`RewardTier::Common`] and
/// [`RewardTier::None`].
pub fn roll_tier<R: Rng + ?Sized>(rng: &mut R, trash_cans_checked: u32, base_chance: f64) -> RewardTier {
    let gated = trash_cans_checked > MEGA_MIN_CHECKED;
    let mega = gated && rng.r#gen::<f64>() < MEGA_CHANCE;
    let double_mega = gated && rng.r#gen::<f64>() < DOUBLE_MEGA_CHANCE;

    if mega {
        RewardTier::Mega
    } else if double_mega {
        RewardTier::DoubleMega
    } else if rng.r#gen::<f64>() < base_chance {
        RewardTier::Common
    } else {
        RewardTier::None
    }
}

/// One garbage can in the world and its state for today.
#[derive(Debug, Clone)]
pub struct GarbageCan {
    id: String,
    location: String,
    tile: (i32, i32),
    luck_bonus: f64,
    state: CanState,
    tier: RewardTier,
    seed: u64,
    contents: Vec<Item>,
    lid: LidColor,
    pending: Option<Delivery>,
}

impl GarbageCan {
    /// A can that stays checked until its first day start.
    pub fn new(id: impl Into<String>, location: impl Into<String>, tile: (i32, i32)) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            tile,
            luck_bonus: 0.0,
            state: CanState::Checked,
            tier: RewardTier::None,
            seed: 0,
            contents: Vec::new(),
            lid: LidColor::DarkGray,
            pending: None,
        }
    }

    pub fn from_spot(spot: &GarbageCanSpot) -> Self {
        Self::new(&spot.id, &spot.location, spot.tile).with_luck_bonus(spot.luck_bonus)
    }

    pub fn with_luck_bonus(mut self, luck_bonus: f64) -> Self {
        self.luck_bonus = luck_bonus;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn tile(&self) -> (i32, i32) {
        self.tile
    }

    pub fn state(&self) -> CanState {
        self.state
    }

    pub fn tier(&self) -> RewardTier {
        self.tier
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn contents(&self) -> &[Item] {
        &self.contents
    }

    pub fn lid(&self) -> LidColor {
        self.lid
    }

    pub fn pending(&self) -> Option<&Delivery> {
        self.pending.as_ref()
    }

    /// Put an item in the can (players may use cans as storage).
    pub fn add_item(&mut self, item: Item) {
        self.contents.push(item);
    }

    /// Take everything out of the can.
    pub fn take_contents(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.contents)
    }

    /// Vanilla cans are numbered; anything else counts as can 0.
    fn can_number(&self) -> i32 {
        self.id.parse().unwrap_or(0)
    }

    /// Reset for a new day and roll today's reward.
    ///
    /// `global_rng` is the host's shared stream, used for the Qi bean check
    /// and lid tint; everything else comes from the can's own daily stream.
    pub fn day_start<R: Rng + ?Sized>(
        &mut self,
        world: &dyn World,
        env: &LootEnvironment<'_>,
        global_rng: &mut R,
    ) -> RewardTier {
        self.state = CanState::Unchecked;
        self.tier = RewardTier::None;
        self.pending = None;
        self.lid = LidColor::DarkGray;

        if world.day_of_month() % 7 == env.config.collection_day {
            tracing::debug!("Garbage day: emptying can {} in {}", self.id, self.location);
            self.contents.clear();
        }

        let can_number = self.can_number();
        self.seed = daily_seed(world.game_seed(), world.days_played(), can_number);
        let mut rng = seeded_rng(self.seed);

        let base_chance = BASE_CHANCE + world.daily_luck() + self.luck_bonus;
        let tier = roll_tier(&mut rng, world.trash_cans_checked(), base_chance);

        match tier {
            RewardTier::None => {
                tracing::trace!("Can {} rolled nothing today", self.id);
                return self.tier;
            }
            RewardTier::DoubleMega => {
                self.tier = tier;
                self.pending = Some(Delivery::GarbageHat(env.catalog.create(GARBAGE_HAT_ID)));
                tracing::debug!("Can {} rolled a double mega reward", self.id);
                return self.tier;
            }
            _ => self.tier = tier,
        }

        if global_rng.r#gen::<f64>() <= 0.25 * self.luck_bonus && world.special_order_active(QI_BEANS_RULE) {
            self.tier = RewardTier::QiBeans;
            self.pending = Some(Delivery::QiBeans(env.catalog.create(QI_BEANS_ID)));
            tracing::debug!("Can {} will drop Qi beans", self.id);
            return self.tier;
        }

        if self.tier == RewardTier::Mega {
            self.pending = Some(Delivery::MegaFanfare);
        }

        match self.find_loot(&mut rng, world, env, can_number, base_chance) {
            Some(item) => {
                tracing::debug!("Can {} stocked with {} ({})", self.id, item.name, item.id);
                self.contents.push(item);
                self.lid = lid_color_for(&self.contents, global_rng);
            }
            None if self.tier == RewardTier::Common => self.tier = RewardTier::None,
            None => {}
        }

        self.tier
    }

    /// Walk the loot fallbacks until one yields an item.
    fn find_loot(
        &self,
        rng: &mut ChaCha8Rng,
        world: &dyn World,
        env: &LootEnvironment<'_>,
        can_number: i32,
        base_chance: f64,
    ) -> Option<Item> {
        if (3..=7).contains(&can_number) {
            if let Some(id) = self.vanilla_loot(rng, world, can_number, base_chance) {
                return Some(env.catalog.create(&id));
            }
        }

        if rng.r#gen::<f64>() < base_chance {
            if let Some(item) = env
                .tables
                .local_for(&self.id)
                .and_then(|table| table.roll(env.catalog, rng))
            {
                return Some(item);
            }
        }

        if rng.r#gen::<f64>() < env.config.seasonal_chance {
            let seed = self.tile.0 as i64 * 653 + self.tile.1 as i64 * 777;
            if let Some(id) = world.seasonal_item(seed) {
                return Some(env.catalog.create(&id));
            }
        }

        env.tables.global.roll(env.catalog, rng)
    }

    /// Hardcoded loot for the vanilla town cans.
    fn vanilla_loot(&self, rng: &mut ChaCha8Rng, world: &dyn World, can_number: i32, base_chance: f64) -> Option<String> {
        let bonus = self.luck_bonus;
        match can_number {
            3 if rng.r#gen::<f64>() < base_chance => {
                // omni geode, else a plain geode
                let id = if rng.r#gen::<f64>() < 0.05 { "749" } else { "535" };
                Some(id.to_string())
            }
            4 if rng.r#gen::<f64>() < base_chance => Some((378 + rng.gen_range(0..3) * 2).to_string()),
            5 if rng.r#gen::<f64>() < base_chance => world
                .dish_of_the_day()
                .map(|dish| if dish == "217" { "216".to_string() } else { dish }),
            6 if rng.r#gen::<f64>() < base_chance => Some("223".to_string()),
            7 if rng.r#gen::<f64>() < 0.2 * bonus => {
                let mut item = None;
                if !world.has_seen_event(JOJA_COLA_EVENT) {
                    item = Some("167");
                }
                if world.has_mail("ccMovieTheater") && !world.has_mail("ccMovieTheaterJoja") {
                    item = Some(if rng.r#gen::<f64>() < 0.25 * bonus { "809" } else { "270" });
                }
                item.map(str::to_string)
            }
            _ => None,
        }
    }

    /// The player opens the can.
    ///
    /// Only the first open of the day checks the can; a pending delivery is
    /// handed out on whichever open comes first after the roll.
    pub fn open(&mut self) -> OpenOutcome {
        let newly_checked = self.state == CanState::Unchecked;
        self.state = CanState::Checked;

        let delivery = self.pending.take();
        let opens_menu = match &delivery {
            Some(Delivery::QiBeans(_)) => false,
            Some(Delivery::GarbageHat(_)) => {
                self.lid = LidColor::Removed;
                false
            }
            Some(Delivery::MegaFanfare) | None => true,
        };

        if newly_checked {
            tracing::debug!("Can {} checked ({:?})", self.id, self.tier);
        }

        OpenOutcome {
            newly_checked,
            opens_menu,
            delivery,
        }
    }

    /// The can's menu was closed.
    pub fn close(&mut self) {
        if self.contents.is_empty() && self.lid != LidColor::Removed {
            self.lid = LidColor::DarkGray;
        }
    }
}
