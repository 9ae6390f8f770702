use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use super::extract::{ApiJson, ApiQuery};
use super::AppState;
use crate::calculator;
use crate::error::ApiResult;
use crate::models::{CalculatorRate, CostBreakdown, CostQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calculator/rates", get(rates_handler))
        .route("/calculator/calculate", post(calculate_handler))
}

#[derive(Debug, Default, Deserialize)]
struct RatesQuery {
    state: Option<String>,
}

#[tracing::instrument(skip(state))]
async fn rates_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RatesQuery>,
) -> ApiResult<Json<Vec<CalculatorRate>>> {
    let wanted = query.state.as_deref().filter(|s| !s.trim().is_empty());
    Ok(Json(state.store.list_rates(wanted).await?))
}

#[tracing::instrument(skip(state))]
async fn calculate_handler(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<CostQuery>,
) -> ApiResult<Json<CostBreakdown>> {
    query.validate()?;
    let rates = state.store.list_rates(Some(&query.state)).await?;
    let breakdown = calculator::calculate(&rates, &query, Utc::now().date_naive())?;
    tracing::debug!(rate_id = %breakdown.rate_id, total = breakdown.total, "costs calculated");

    Ok(Json(breakdown))
}
