// Metrics module
//
// Lightweight counters for storage admissions, vacuuming and garbage can rewards

use crate::services::garbage::RewardTier;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Running totals for one session.
///
/// Uses atomic operations so any thread holding a shared reference can record
/// without locking. Logged once on shutdown via [`log_summary()`](Self::log_summary).
#[derive(Debug)]
pub struct Metrics {
    /// Items a storage accepted
    pub items_admitted: AtomicUsize,

    /// Items a storage refused
    pub items_rejected: AtomicUsize,

    /// Items routed into carried storages
    pub items_vacuumed: AtomicUsize,

    /// First opens of a garbage can on a given day
    pub cans_checked: AtomicUsize,

    /// Can-days that rolled nothing
    pub empty_cans: AtomicU64,

    pub common_rewards: AtomicU64,
    pub qi_bean_rewards: AtomicU64,
    pub mega_rewards: AtomicU64,
    pub double_mega_rewards: AtomicU64,

    /// Registry reloads
    pub reloads: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            items_admitted: AtomicUsize::new(0),
            items_rejected: AtomicUsize::new(0),
            items_vacuumed: AtomicUsize::new(0),
            cans_checked: AtomicUsize::new(0),
            empty_cans: AtomicU64::new(0),
            common_rewards: AtomicU64::new(0),
            qi_bean_rewards: AtomicU64::new(0),
            mega_rewards: AtomicU64::new(0),
            double_mega_rewards: AtomicU64::new(0),
            reloads: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the result of an admission check
    pub fn record_admission(&self, admitted: bool) {
        if admitted {
            self.items_admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.items_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_vacuumed(&self) {
        self.items_vacuumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_can_checked(&self) {
        self.cans_checked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the tier a can rolled at day start
    pub fn record_reward(&self, tier: RewardTier) {
        let counter = match tier {
            RewardTier::None => &self.empty_cans,
            RewardTier::Common => &self.common_rewards,
            RewardTier::QiBeans => &self.qi_bean_rewards,
            RewardTier::Mega => &self.mega_rewards,
            RewardTier::DoubleMega => &self.double_mega_rewards,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    /// Total rewards of any tier
    pub fn total_rewards(&self) -> u64 {
        self.common_rewards.load(Ordering::Relaxed)
            + self.qi_bean_rewards.load(Ordering::Relaxed)
            + self.mega_rewards.load(Ordering::Relaxed)
            + self.double_mega_rewards.load(Ordering::Relaxed)
    }

    /// Fraction of can-days that rolled a reward
    pub fn reward_rate(&self) -> f64 {
        let rewards = self.total_rewards();
        let total = rewards + self.empty_cans.load(Ordering::Relaxed);
        if total > 0 {
            rewards as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== ChestKeeper Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Storage: {} admitted, {} rejected, {} vacuumed, {} reloads",
            self.items_admitted.load(Ordering::Relaxed),
            self.items_rejected.load(Ordering::Relaxed),
            self.items_vacuumed.load(Ordering::Relaxed),
            self.reloads.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Garbage: {} checked, {} empty, {} common, {} qi beans, {} mega, {} double mega (rate {:.1}%)",
            self.cans_checked.load(Ordering::Relaxed),
            self.empty_cans.load(Ordering::Relaxed),
            self.common_rewards.load(Ordering::Relaxed),
            self.qi_bean_rewards.load(Ordering::Relaxed),
            self.mega_rewards.load(Ordering::Relaxed),
            self.double_mega_rewards.load(Ordering::Relaxed),
            self.reward_rate() * 100.0
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
