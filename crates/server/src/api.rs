use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use taskwire_scheduler::ReminderScheduler;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<ReminderScheduler>,
}

#[derive(Debug, Serialize)]
struct TickResponse {
    status: &'static str,
    reminders_found: usize,
    reminders_sent: usize,
}

async fn tick(State(state): State<AppState>) -> Json<TickResponse> {
    let summary = state.scheduler.tick().await;
    Json(TickResponse {
        status: "ok",
        reminders_found: summary.found,
        reminders_sent: summary.sent,
    })
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/reminders/tick", post(tick))
        .route("/healthz", get(healthz))
        .with_state(state)
}
