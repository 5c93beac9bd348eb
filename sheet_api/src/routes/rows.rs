use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use domain::ChainMode;
use serde::{Deserialize, Serialize};

use crate::{routes::ApiError, services::RenderedPortfolio, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/rows", get(get_rows))
}

#[derive(Debug, Deserialize)]
struct RowsQuery {
    address: Option<String>,
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct RowsResponse {
    /// `"empty"` when the remote had nothing to render, so the caller can
    /// tell it apart from a failure.
    status: &'static str,
    #[serde(flatten)]
    portfolio: RenderedPortfolio,
}

async fn get_rows(
    State(state): State<AppState>,
    Query(params): Query<RowsQuery>,
) -> Result<Json<RowsResponse>, ApiError> {
    let mode = params
        .mode
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<ChainMode>())
        .transpose()
        .map_err(|err| ApiError::bad_request("Invalid 'mode' parameter", err.to_string()))?;
    let address = params.address.unwrap_or_default();

    let portfolio = state.sync.render(&address, mode).await?;
    let status = if portfolio.table.is_empty() {
        "empty"
    } else {
        "ok"
    };
    Ok(Json(RowsResponse { status, portfolio }))
}
