use crate::rollover::DEFAULT_CHECK_INTERVAL;
use chrono::NaiveTime;
use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/wird_state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Fixed dawn time; when absent the anchor is pushed over the API.
    pub dawn_time: Option<NaiveTime>,
    pub check_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            dawn_time: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_or(lookup("PORT"), "PORT", defaults.port, |v| v.parse().ok());
        let data_path = lookup("WIRD_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let dawn_time = lookup("WIRD_DAWN_TIME").and_then(|value| {
            let parsed = parse_clock_time(&value);
            if parsed.is_none() {
                warn!("ignoring WIRD_DAWN_TIME={value}: expected HH:MM");
            }
            parsed
        });
        let check_interval = parse_or(
            lookup("WIRD_CHECK_INTERVAL_SECS"),
            "WIRD_CHECK_INTERVAL_SECS",
            defaults.check_interval,
            |v| v.parse::<u64>().ok().filter(|secs| *secs > 0).map(Duration::from_secs),
        );

        Self {
            port,
            data_path,
            dawn_time,
            check_interval,
        }
    }
}

fn parse_or<T>(
    value: Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match value {
        None => default,
        Some(raw) => parse(raw.trim()).unwrap_or_else(|| {
            warn!("ignoring invalid {key}={raw}");
            default
        }),
    }
}

pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}
