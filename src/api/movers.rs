use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use super::extract::{ApiJson, ApiQuery};
use super::{AppState, StatusQuery};
use crate::error::ApiResult;
use crate::models::{MovingRequest, NewMovingRequest, RequestStatus};

pub fn router() -> Router<AppState> {
    Router::new().route("/packers-movers", get(list_handler).post(create_handler))
}

#[tracing::instrument(skip(state, request), fields(from = %request.from_city, to = %request.to_city))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewMovingRequest>,
) -> ApiResult<(StatusCode, Json<MovingRequest>)> {
    let now = Utc::now();
    request.validate(now.date_naive())?;
    let request = state
        .store
        .create_moving_request(request.into_request(now))
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery<RequestStatus>>,
) -> ApiResult<Json<Vec<MovingRequest>>> {
    Ok(Json(state.store.list_moving_requests(query.status).await?))
}
