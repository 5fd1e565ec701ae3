use crate::anchor::{AnchorCache, AnchorTimeProvider, FixedDawn};
use crate::clock::ClockSource;
use crate::config::Config;
use crate::notify::{EventHub, NotificationSink};
use crate::rollover::RolloverScheduler;
use crate::store::ProgressStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: ProgressStore,
    pub clock: Arc<dyn ClockSource>,
    /// Present when the dawn time is pushed over the API.
    pub anchor_cache: Option<Arc<AnchorCache>>,
    pub anchor: Arc<dyn AnchorTimeProvider>,
    pub events: EventHub,
    pub scheduler: Arc<RolloverScheduler>,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: ProgressStore,
        clock: Arc<dyn ClockSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (anchor_cache, anchor) = match config.dawn_time {
            Some(dawn) => {
                let fixed: Arc<dyn AnchorTimeProvider> =
                    Arc::new(FixedDawn::new(dawn, clock.clone()));
                (None, fixed)
            }
            None => {
                let cache = Arc::new(AnchorCache::new(clock.clone()));
                let provider: Arc<dyn AnchorTimeProvider> = cache.clone();
                (Some(cache), provider)
            }
        };

        let events = EventHub::new(sink);
        let scheduler = Arc::new(RolloverScheduler::new(
            store.clone(),
            clock.clone(),
            anchor.clone(),
            events.clone(),
        ));

        Self {
            store,
            clock,
            anchor_cache,
            anchor,
            events,
            scheduler,
        }
    }
}
