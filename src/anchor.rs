use crate::clock::ClockSource;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};
use tracing::{debug, info};

/// Supplies today's dawn instant, the anchor of the logical day.
///
/// Implementations return `None` while nothing has been fetched yet; they
/// never fail.
pub trait AnchorTimeProvider: Send + Sync {
    fn today_anchor_instant(&self) -> Option<NaiveDateTime>;

    /// Ask the upstream source for fresh data, keeping what is held now.
    fn request_refresh(&self) {}

    /// Drop data that can no longer be trusted and ask for fresh data.
    fn invalidate(&self) {
        self.request_refresh();
    }

    fn refresh_requested(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorEntry {
    pub date: NaiveDate,
    pub dawn: NaiveTime,
}

impl AnchorEntry {
    pub fn instant(&self) -> NaiveDateTime {
        self.date.and_time(self.dawn)
    }
}

/// Holds the last dawn time pushed by the prayer-time fetcher.
///
/// A dawn time pushed yesterday (or for tomorrow) stands in for today's
/// until a fresh one arrives. Older entries are returned as they are so the
/// caller can see they are stale.
pub struct AnchorCache {
    clock: Arc<dyn ClockSource>,
    entry: RwLock<Option<AnchorEntry>>,
    refresh: AtomicBool,
}

impl AnchorCache {
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            clock,
            entry: RwLock::new(None),
            refresh: AtomicBool::new(false),
        }
    }

    pub fn set(&self, date: NaiveDate, dawn: NaiveTime) {
        let entry = AnchorEntry { date, dawn };
        *self.entry.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(entry);
        self.refresh.store(false, Ordering::SeqCst);
        info!(%date, %dawn, "anchor time updated");
    }

    pub fn entry(&self) -> Option<AnchorEntry> {
        *self.entry.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AnchorTimeProvider for AnchorCache {
    fn today_anchor_instant(&self) -> Option<NaiveDateTime> {
        let entry = self.entry()?;
        let today = self.clock.now().date();
        if (today - entry.date).num_days().abs() <= 1 {
            Some(today.and_time(entry.dawn))
        } else {
            Some(entry.instant())
        }
    }

    fn request_refresh(&self) {
        if !self.refresh.swap(true, Ordering::SeqCst) {
            info!("anchor refresh requested");
        }
    }

    fn invalidate(&self) {
        self.entry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        self.request_refresh();
    }

    fn refresh_requested(&self) -> bool {
        self.refresh.load(Ordering::SeqCst)
    }
}

/// A constant dawn time applied to whatever day the clock says it is.
pub struct FixedDawn {
    dawn: NaiveTime,
    clock: Arc<dyn ClockSource>,
}

impl FixedDawn {
    pub fn new(dawn: NaiveTime, clock: Arc<dyn ClockSource>) -> Self {
        Self { dawn, clock }
    }
}

impl AnchorTimeProvider for FixedDawn {
    fn today_anchor_instant(&self) -> Option<NaiveDateTime> {
        Some(self.clock.now().date().and_time(self.dawn))
    }

    fn request_refresh(&self) {
        debug!("fixed dawn time has nothing to refresh");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn clock_at(d: u32, h: u32) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(day(d).and_hms_opt(h, 0, 0).unwrap()))
    }

    #[test]
    fn cache_is_empty_until_set() {
        let cache = AnchorCache::new(clock_at(20, 12));
        assert_eq!(cache.today_anchor_instant(), None);

        let dawn = NaiveTime::from_hms_opt(4, 58, 0).unwrap();
        cache.set(day(20), dawn);
        assert_eq!(cache.today_anchor_instant(), Some(day(20).and_time(dawn)));
    }

    #[test]
    fn yesterdays_dawn_is_applied_to_today() {
        let clock = clock_at(10, 12);
        let cache = AnchorCache::new(clock.clone());
        let dawn = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        cache.set(day(10), dawn);

        clock.set(day(11).and_hms_opt(0, 30, 0).unwrap());
        assert_eq!(cache.today_anchor_instant(), Some(day(11).and_time(dawn)));
    }

    #[test]
    fn old_entries_keep_their_own_date() {
        let cache = AnchorCache::new(clock_at(12, 12));
        let dawn = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        cache.set(day(7), dawn);
        assert_eq!(cache.today_anchor_instant(), Some(day(7).and_time(dawn)));
    }

    #[test]
    fn refresh_request_keeps_entry() {
        let cache = AnchorCache::new(clock_at(1, 12));
        let dawn = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        cache.set(day(1), dawn);

        cache.request_refresh();
        assert!(cache.refresh_requested());
        assert_eq!(cache.today_anchor_instant(), Some(day(1).and_time(dawn)));
    }

    #[test]
    fn invalidate_drops_entry_until_next_set() {
        let cache = AnchorCache::new(clock_at(2, 12));
        let dawn = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        cache.set(day(1), dawn);

        cache.invalidate();
        assert!(cache.refresh_requested());
        assert_eq!(cache.today_anchor_instant(), None);

        cache.set(day(2), dawn);
        assert!(!cache.refresh_requested());
    }

    #[test]
    fn fixed_dawn_follows_clock_date() {
        let clock = Arc::new(ManualClock::new(day(3).and_hms_opt(12, 0, 0).unwrap()));
        let dawn = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        let provider = FixedDawn::new(dawn, clock.clone());
        assert_eq!(provider.today_anchor_instant(), Some(day(3).and_time(dawn)));

        clock.set(day(4).and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(provider.today_anchor_instant(), Some(day(4).and_time(dawn)));
    }
}
