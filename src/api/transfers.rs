use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use super::extract::{ApiJson, ApiQuery};
use super::{AppState, StatusQuery};
use crate::error::ApiResult;
use crate::models::{NewPropertyTransfer, PropertyTransfer, RequestStatus};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/property-transfers",
        get(list_handler).post(create_handler),
    )
}

#[tracing::instrument(skip(state, transfer), fields(kind = %transfer.transfer_type))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(transfer): ApiJson<NewPropertyTransfer>,
) -> ApiResult<(StatusCode, Json<PropertyTransfer>)> {
    transfer.validate()?;
    let transfer = state
        .store
        .create_transfer(transfer.into_transfer(Utc::now()))
        .await?;

    Ok((StatusCode::CREATED, Json(transfer)))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery<RequestStatus>>,
) -> ApiResult<Json<Vec<PropertyTransfer>>> {
    Ok(Json(state.store.list_transfers(query.status).await?))
}
