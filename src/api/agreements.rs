use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppState, StatusQuery};
use crate::error::{ApiResult, AppError};
use crate::models::{Agreement, NewAgreement, RequestStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rental-agreements",
            get(list_handler).post(create_handler),
        )
        .route("/rental-agreements/:id", get(get_handler))
}

#[tracing::instrument(skip(state, agreement), fields(city = %agreement.city))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(agreement): ApiJson<NewAgreement>,
) -> ApiResult<(StatusCode, Json<Agreement>)> {
    agreement.validate()?;
    let agreement = state
        .store
        .create_agreement(agreement.into_agreement(Utc::now()))
        .await?;
    tracing::info!(agreement_id = %agreement.id, "agreement drafted");

    Ok((StatusCode::CREATED, Json(agreement)))
}

#[tracing::instrument(skip(state))]
async fn get_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Agreement>> {
    state
        .store
        .get_agreement(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Agreement"))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery<RequestStatus>>,
) -> ApiResult<Json<Vec<Agreement>>> {
    Ok(Json(state.store.list_agreements(query.status).await?))
}
