use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;
use domain::HealthResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/upstream/health", get(upstream_health))
}

#[derive(Debug, Serialize)]
struct UpstreamHealth {
    endpoint: String,
    #[serde(flatten)]
    result: HealthResult,
    /// Whether the monitor would notify for this result right now.
    would_alert: bool,
}

// Read-only check: never notifies, regardless of the result.
async fn upstream_health(State(state): State<AppState>) -> Json<UpstreamHealth> {
    let now = Utc::now();
    let result = state.checker.check().await.with_checked_at(now);
    let would_alert = state.config.alert_window.should_alert(&result, now);
    Json(UpstreamHealth {
        endpoint: state.checker.url().to_string(),
        result,
        would_alert,
    })
}
