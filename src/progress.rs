use crate::errors::WirdError;
use crate::plan::{Slot, SLOT_COUNT};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Where the reader is in the plan. There is exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(alias = "day")]
    pub day_index: u32,
    #[serde(default, alias = "completed")]
    pub day_fully_completed: bool,
    #[serde(default, alias = "prayersCompleted")]
    pub sub_units_completed: [bool; SLOT_COUNT],
    #[serde(
        default,
        alias = "lastDate",
        deserialize_with = "deserialize_timestamp"
    )]
    pub last_interaction_timestamp: Option<NaiveDateTime>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            day_index: 1,
            day_fully_completed: false,
            sub_units_completed: [false; SLOT_COUNT],
            last_interaction_timestamp: None,
        }
    }
}

impl ProgressRecord {
    /// Decodes a stored record, checking it against the plan length.
    ///
    /// Legacy browser records (`day`, `completed`, `prayersCompleted`,
    /// `lastDate`) are accepted. Anything that does not fit is reported as
    /// corrupt so the caller can fall back to the default record.
    pub fn from_stored(
        value: serde_json::Value,
        plan_length_days: u32,
    ) -> Result<Self, WirdError> {
        let mut record: ProgressRecord = serde_json::from_value(value)
            .map_err(|err| WirdError::CorruptProgress(err.to_string()))?;

        if record.day_index == 0 || record.day_index > plan_length_days + 1 {
            return Err(WirdError::CorruptProgress(format!(
                "day index {} outside 1..={}",
                record.day_index,
                plan_length_days + 1
            )));
        }

        record.recompute_completion();
        Ok(record)
    }

    pub fn completed_count(&self) -> usize {
        self.sub_units_completed.iter().filter(|done| **done).count()
    }

    pub fn is_plan_complete(&self, plan_length_days: u32) -> bool {
        self.day_index > plan_length_days
    }

    pub fn is_slot_done(&self, slot: Slot) -> bool {
        self.sub_units_completed[slot.index()]
    }

    /// Flips one slot. Returns true when this toggle finished the day.
    pub fn toggle(&mut self, slot: Slot, now: NaiveDateTime) -> bool {
        let was_complete = self.day_fully_completed;
        let done = &mut self.sub_units_completed[slot.index()];
        *done = !*done;
        self.last_interaction_timestamp = Some(now);
        self.recompute_completion();
        self.day_fully_completed && !was_complete
    }

    /// The record for the next logical day.
    pub fn rolled_over(&self, now: NaiveDateTime) -> Self {
        Self {
            day_index: self.day_index + 1,
            day_fully_completed: false,
            sub_units_completed: [false; SLOT_COUNT],
            last_interaction_timestamp: Some(now),
        }
    }

    /// Clears today's slots but keeps the day and the last interaction.
    pub fn clear_today(&mut self) {
        self.sub_units_completed = [false; SLOT_COUNT];
        self.recompute_completion();
    }

    fn recompute_completion(&mut self) {
        self.day_fully_completed = self.sub_units_completed.iter().all(|done| *done);
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(text) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {text}"))),
    }
}

/// Accepts ISO date-times as well as the date-only forms older records used.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    for format in ["%Y-%m-%d", "%a %b %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
