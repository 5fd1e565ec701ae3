use crate::rollover::SchedulerPhase;
use crate::warning::WarningLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub slot: usize,
}

#[derive(Debug, Deserialize)]
pub struct RepetitionRequest {
    pub count: u32,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnchorRequest {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    /// `HH:MM`
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct AnchorResponse {
    pub anchor: Option<String>,
    pub refresh_requested: bool,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct WirdView {
    pub day_index: u32,
    pub plan_length_days: u32,
    pub repetition_count: u32,
    pub pages_per_day: u32,
    pub slots: Vec<SlotView>,
    pub completed_slots: usize,
    pub day_fully_completed: bool,
    pub progress_percent: f64,
    pub warning: WarningLevel,
    pub plan_complete: bool,
    pub logical_date: Option<String>,
    pub scheduler_phase: SchedulerPhase,
}
