use crate::actions;
use crate::config::parse_clock_time;
use crate::errors::{AppError, WirdError};
use crate::logical_date::parse_date_key;
use crate::models::{
    AnchorRequest, AnchorResponse, RepetitionRequest, ResetRequest, ToggleRequest, WirdView,
};
use crate::notify::WirdEvent;
use crate::plan::Slot;
use crate::rollover::CheckOutcome;
use crate::state::AppState;
use crate::view::build_view_at;
use axum::{extract::State, Json};
use tracing::info;

pub async fn get_wird(State(state): State<AppState>) -> Result<Json<WirdView>, AppError> {
    Ok(Json(current_view(&state).await))
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<WirdView>, AppError> {
    let slot = Slot::from_index(payload.slot).ok_or(WirdError::InvalidSlot(payload.slot))?;
    let now = state.clock.now();

    let (finished, day_index) = state
        .store
        .update(|wird| {
            let finished = actions::toggle_slot(wird, slot, now)?;
            Ok::<_, WirdError>((finished, wird.progress.day_index))
        })
        .await?;

    if finished {
        state.events.publish(WirdEvent::DayCompleted { day_index });
    }

    Ok(Json(current_view(&state).await))
}

pub async fn set_repetitions(
    State(state): State<AppState>,
    Json(payload): Json<RepetitionRequest>,
) -> Result<Json<WirdView>, AppError> {
    state
        .store
        .update(|wird| actions::change_repetitions(wird, payload.count, payload.confirm))
        .await?;
    info!(count = payload.count, "repetition count updated");
    Ok(Json(current_view(&state).await))
}

pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<WirdView>, AppError> {
    state
        .store
        .update(|wird| actions::restart_plan(wird, payload.confirm))
        .await?;
    info!("plan restarted");
    Ok(Json(current_view(&state).await))
}

pub async fn check_rollover(State(state): State<AppState>) -> Result<Json<CheckOutcome>, AppError> {
    let outcome = state.scheduler.check().await?;
    Ok(Json(outcome))
}

pub async fn get_anchor(State(state): State<AppState>) -> Json<AnchorResponse> {
    Json(anchor_response(&state))
}

pub async fn set_anchor(
    State(state): State<AppState>,
    Json(payload): Json<AnchorRequest>,
) -> Result<Json<AnchorResponse>, AppError> {
    let Some(cache) = state.anchor_cache.as_ref() else {
        return Err(AppError::conflict("dawn time is fixed by configuration"));
    };

    let dawn = parse_clock_time(&payload.time)
        .ok_or_else(|| AppError::bad_request("time must be HH:MM"))?;
    let date = match payload.date.as_deref() {
        Some(raw) => parse_date_key(raw)
            .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?,
        None => state.clock.now().date(),
    };

    cache.set(date, dawn);
    Ok(Json(anchor_response(&state)))
}

async fn current_view(state: &AppState) -> WirdView {
    let snapshot = state.store.snapshot().await;
    build_view_at(state.clock.now(), &snapshot, state.scheduler.phase())
}

fn anchor_response(state: &AppState) -> AnchorResponse {
    AnchorResponse {
        anchor: state
            .anchor
            .today_anchor_instant()
            .map(|instant| instant.format("%Y-%m-%dT%H:%M").to_string()),
        refresh_requested: state.anchor.refresh_requested(),
    }
}
