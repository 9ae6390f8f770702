use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use super::extract::{ApiJson, ApiQuery};
use super::{AppState, StatusQuery};
use crate::error::ApiResult;
use crate::models::{LegalServiceRequest, NewLegalServiceRequest, RequestStatus};

pub fn router() -> Router<AppState> {
    Router::new().route("/legal-services", get(list_handler).post(create_handler))
}

#[tracing::instrument(skip(state, request), fields(service = %request.service_type))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewLegalServiceRequest>,
) -> ApiResult<(StatusCode, Json<LegalServiceRequest>)> {
    request.validate()?;
    let request = state
        .store
        .create_legal_request(request.into_request(Utc::now()))
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery<RequestStatus>>,
) -> ApiResult<Json<Vec<LegalServiceRequest>>> {
    Ok(Json(state.store.list_legal_requests(query.status).await?))
}
