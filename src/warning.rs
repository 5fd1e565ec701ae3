use crate::plan::SLOT_COUNT;
use crate::progress::ProgressRecord;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    None,
    /// Yesterday was started but not finished.
    PartialMiss,
    /// A whole day went by without any reading.
    FullMiss,
}

/// Classifies how far behind the reader is.
///
/// Days are counted between calendar dates, so activity earlier today never
/// counts as a missed day.
pub fn evaluate(progress: &ProgressRecord, now: NaiveDateTime) -> WarningLevel {
    let Some(last) = progress.last_interaction_timestamp else {
        return WarningLevel::None;
    };
    if progress.day_fully_completed {
        return WarningLevel::None;
    }

    let days_since = (now.date() - last.date()).num_days().abs();
    let completed = progress.completed_count();

    if days_since > 1 {
        WarningLevel::FullMiss
    } else if days_since >= 1 && completed > 0 && completed < SLOT_COUNT {
        WarningLevel::PartialMiss
    } else {
        WarningLevel::None
    }
}
