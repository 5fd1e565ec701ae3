pub mod actions;
pub mod anchor;
pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logical_date;
pub mod models;
pub mod notify;
pub mod plan;
pub mod progress;
pub mod rollover;
pub mod state;
pub mod storage;
pub mod store;
pub mod view;
pub mod warning;

pub use app::router;
pub use config::Config;
pub use rollover::{CheckOutcome, RolloverScheduler};
pub use state::AppState;
pub use store::{ProgressStore, WirdState};
