use crate::anchor::AnchorTimeProvider;
use crate::clock::ClockSource;
use crate::errors::WirdError;
use crate::logical_date::compute_logical_date;
use crate::notify::{EventHub, WirdEvent};
use crate::progress::ProgressRecord;
use crate::store::ProgressStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Checking,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// First run: the marker was recorded, nothing else changed.
    Initialized { logical_date: NaiveDate },
    Unchanged { logical_date: NaiveDate },
    RolledOver {
        from: NaiveDate,
        to: NaiveDate,
        day_index: u32,
    },
    /// The plan is finished; only the marker moved.
    PlanComplete { logical_date: NaiveDate },
    /// The computed date is behind the stored one. Nothing changes; this is
    /// normal when a dawn time arrives after the midnight fallback already
    /// moved the marker.
    MarkerRegressed {
        stored: NaiveDate,
        logical_date: NaiveDate,
    },
    /// The anchor was too far from now to be trusted.
    StaleAnchor,
}

/// Compares the current logical date with the stored marker.
pub fn decide(
    marker: Option<NaiveDate>,
    logical_date: NaiveDate,
    progress: &ProgressRecord,
    plan_length_days: u32,
) -> CheckOutcome {
    let Some(stored) = marker else {
        return CheckOutcome::Initialized { logical_date };
    };

    if logical_date == stored {
        CheckOutcome::Unchanged { logical_date }
    } else if logical_date < stored {
        CheckOutcome::MarkerRegressed {
            stored,
            logical_date,
        }
    } else if progress.is_plan_complete(plan_length_days) {
        CheckOutcome::PlanComplete { logical_date }
    } else {
        CheckOutcome::RolledOver {
            from: stored,
            to: logical_date,
            day_index: progress.day_index + 1,
        }
    }
}

/// Detects logical-day changes and advances the plan exactly once per change.
pub struct RolloverScheduler {
    store: ProgressStore,
    clock: Arc<dyn ClockSource>,
    anchor: Arc<dyn AnchorTimeProvider>,
    events: EventHub,
    phase: watch::Sender<SchedulerPhase>,
    running: Mutex<()>,
}

impl RolloverScheduler {
    pub fn new(
        store: ProgressStore,
        clock: Arc<dyn ClockSource>,
        anchor: Arc<dyn AnchorTimeProvider>,
        events: EventHub,
    ) -> Self {
        let (phase, _) = watch::channel(SchedulerPhase::Idle);
        Self {
            store,
            clock,
            anchor,
            events,
            phase,
            running: Mutex::new(()),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.subscribe()
    }

    /// One read-compute-write pass. Safe to call at any time; checks never
    /// overlap.
    pub async fn check(&self) -> Result<CheckOutcome, WirdError> {
        let _running = self.running.lock().await;
        self.phase.send_replace(SchedulerPhase::Checking);
        let result = self.run_check().await;
        self.phase.send_replace(SchedulerPhase::Idle);
        result
    }

    async fn run_check(&self) -> Result<CheckOutcome, WirdError> {
        let now = self.clock.now();
        let anchor = self.anchor.today_anchor_instant();
        let logical_date = match compute_logical_date(now, anchor) {
            Ok(date) => date,
            Err(err @ WirdError::StaleAnchor { .. }) => {
                warn!("{err}; skipping rollover until a fresh anchor arrives");
                self.anchor.invalidate();
                return Ok(CheckOutcome::StaleAnchor);
            }
            Err(err) => return Err(err),
        };

        let phase = &self.phase;
        let outcome = self
            .store
            .update(|state| {
                let plan_length = state.plan().plan_length_days;
                let outcome = decide(state.marker, logical_date, &state.progress, plan_length);
                match outcome {
                    CheckOutcome::Initialized { .. } | CheckOutcome::PlanComplete { .. } => {
                        state.marker = Some(logical_date);
                    }
                    CheckOutcome::RolledOver { .. } => {
                        phase.send_replace(SchedulerPhase::Transitioning);
                        state.progress = state.progress.rolled_over(now);
                        state.marker = Some(logical_date);
                    }
                    CheckOutcome::Unchanged { .. }
                    | CheckOutcome::MarkerRegressed { .. }
                    | CheckOutcome::StaleAnchor => {}
                }
                Ok::<_, WirdError>(outcome)
            })
            .await?;

        match outcome {
            CheckOutcome::RolledOver {
                from,
                to,
                day_index,
            } => {
                info!(%from, %to, day_index, "wird rolled over");
                if anchor.is_some() && (to - from).num_days() > 1 {
                    warn!(%from, %to, "logical date jumped more than a day; requesting fresh anchor");
                    self.anchor.request_refresh();
                }
                self.events.publish(WirdEvent::DayRolledOver {
                    from,
                    to,
                    day_index,
                });
            }
            CheckOutcome::MarkerRegressed {
                stored,
                logical_date,
            } => {
                if (stored - logical_date).num_days() > 1 {
                    warn!(%stored, %logical_date, "logical date went back more than a day; requesting fresh anchor");
                    self.anchor.request_refresh();
                } else {
                    debug!(%stored, %logical_date, "logical date behind marker; keeping marker");
                }
            }
            CheckOutcome::Initialized { logical_date } => {
                info!(%logical_date, "recorded first logical date");
            }
            CheckOutcome::PlanComplete { .. } => {
                debug!("plan complete; waiting for a restart");
            }
            CheckOutcome::Unchanged { .. } | CheckOutcome::StaleAnchor => {}
        }

        Ok(outcome)
    }

    /// Checks now and then every `period`. A failed check is logged and the
    /// next tick tries again.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.check().await {
                    Ok(outcome) => debug!(?outcome, "rollover check"),
                    Err(err) => error!("rollover check failed: {err}"),
                }
            }
        })
    }
}
