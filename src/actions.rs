use crate::errors::WirdError;
use crate::plan::{Slot, MAX_REPETITIONS};
use crate::progress::ProgressRecord;
use crate::store::WirdState;
use chrono::NaiveDateTime;

/// Marks a prayer slot done or undone. Returns true when this finished the
/// day.
pub fn toggle_slot(state: &mut WirdState, slot: Slot, now: NaiveDateTime) -> Result<bool, WirdError> {
    if state.progress.is_plan_complete(state.plan().plan_length_days) {
        return Err(WirdError::PlanComplete);
    }
    Ok(state.progress.toggle(slot, now))
}

/// Switches to a different number of read-throughs. Today's slots are
/// cleared, so the caller must have asked the user first.
pub fn change_repetitions(state: &mut WirdState, count: u32, confirmed: bool) -> Result<(), WirdError> {
    if !(1..=MAX_REPETITIONS).contains(&count) {
        return Err(WirdError::InvalidRepetitionCount {
            count,
            max: MAX_REPETITIONS,
        });
    }
    if count == state.repetition_count {
        return Ok(());
    }
    if !confirmed {
        return Err(WirdError::ConfirmationRequired);
    }

    state.repetition_count = count;
    state.progress.clear_today();
    Ok(())
}

/// Starts the plan over from day one. The logical date marker is kept so
/// the restart does not count as a rollover.
pub fn restart_plan(state: &mut WirdState, confirmed: bool) -> Result<(), WirdError> {
    if !confirmed {
        return Err(WirdError::ConfirmationRequired);
    }
    state.progress = ProgressRecord::default();
    Ok(())
}
