use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/wird", get(handlers::get_wird))
        .route("/api/wird/toggle", post(handlers::toggle))
        .route("/api/wird/repetitions", post(handlers::set_repetitions))
        .route("/api/wird/reset", post(handlers::reset))
        .route("/api/rollover/check", post(handlers::check_rollover))
        .route("/api/anchor", get(handlers::get_anchor).post(handlers::set_anchor))
        .with_state(state)
}
