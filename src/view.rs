use crate::logical_date::date_key;
use crate::models::{SlotView, WirdView};
use crate::plan::{progress_percent, Slot};
use crate::rollover::SchedulerPhase;
use crate::store::WirdState;
use crate::warning::evaluate;
use chrono::NaiveDateTime;

pub fn build_view_at(now: NaiveDateTime, state: &WirdState, phase: SchedulerPhase) -> WirdView {
    let plan = state.plan();
    let progress = &state.progress;
    let plan_complete = progress.is_plan_complete(plan.plan_length_days);

    let slots = if plan_complete {
        Vec::new()
    } else {
        let allocation = plan.allocate(progress.day_index);
        Slot::ALL
            .iter()
            .zip(allocation.ranges.iter())
            .map(|(slot, range)| SlotView {
                index: slot.index(),
                name: slot.name().to_string(),
                start_page: range.start,
                end_page: range.end,
                done: progress.is_slot_done(*slot),
            })
            .collect()
    };

    WirdView {
        day_index: progress.day_index,
        plan_length_days: plan.plan_length_days,
        repetition_count: plan.repetition_count,
        pages_per_day: plan.units_per_day(),
        slots,
        completed_slots: progress.completed_count(),
        day_fully_completed: progress.day_fully_completed,
        progress_percent: progress_percent(
            progress.day_index,
            progress.completed_count(),
            plan.plan_length_days,
        ),
        warning: evaluate(progress, now),
        plan_complete,
        logical_date: state.marker.map(date_key),
        scheduler_phase: phase,
    }
}
