// src/routes/mod.rs

use crate::{
    handlers::{
        calendar::{
            convert_to_gregorian, get_current_deadline, get_deadline, get_next_deadline, get_today,
            get_yearly_deadlines,
        },
        periods::{
            get_current_period, get_period_stats, list_period_reports, list_periods,
            submit_report, trigger_rollover, update_current_target,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Calendar ─────────────────────────────────────────
        .route("/calendar/today", get(get_today))
        .route("/calendar/convert", get(convert_to_gregorian))
        // ─── Deadlines ────────────────────────────────────────
        .route("/deadlines/current", get(get_current_deadline))
        .route("/deadlines/next", get(get_next_deadline))
        .route("/deadlines/years/{year}", get(get_yearly_deadlines))
        .route("/deadlines/years/{year}/months/{month}", get(get_deadline))
        // ─── Periods ──────────────────────────────────────────
        .route("/periods", get(list_periods))
        .route("/periods/current", get(get_current_period))
        .route("/periods/current/target", put(update_current_target))
        .route("/periods/rollover", post(trigger_rollover))
        // ─── Reports ──────────────────────────────────────────
        .route("/periods/{period_id}/reports", get(list_period_reports))
        .route("/periods/{period_id}/stats", get(get_period_stats))
        .route(
            "/periods/{period_id}/reports/{user_id}/submit",
            post(submit_report),
        )
}
