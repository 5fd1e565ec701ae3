use crate::errors::WirdError;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// The logical day flips this long before dawn.
pub const ROLLOVER_LEAD: Duration = Duration::minutes(10);

/// An anchor further than this from `now` is treated as stale.
pub const MAX_ANCHOR_DISTANCE: Duration = Duration::days(1);

/// Maps a wall-clock instant to the plan's logical date.
///
/// Without an anchor the calendar date of `now` is used. With one, anything
/// before `anchor - ROLLOVER_LEAD` still belongs to the previous day.
pub fn compute_logical_date(
    now: NaiveDateTime,
    anchor: Option<NaiveDateTime>,
) -> Result<NaiveDate, WirdError> {
    let Some(anchor) = anchor else {
        return Ok(now.date());
    };

    if (now - anchor).abs() > MAX_ANCHOR_DISTANCE {
        return Err(WirdError::StaleAnchor { anchor, now });
    }

    let cutoff = anchor - ROLLOVER_LEAD;
    if now < cutoff {
        Ok(now.date() - Duration::days(1))
    } else {
        Ok(now.date())
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Reads a stored date key. Markers written by the browser version used
/// `toDateString()` (`Mon Mar 09 2026`), which is accepted too.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    ["%Y-%m-%d", "%a %b %d %Y"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(key, format).ok())
}
