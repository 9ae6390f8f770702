use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::error::{ApiResult, AppError};
use crate::models::{Inquiry, InquiryFilter, NewInquiry, RequestStatus, StatusUpdate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/property-inquiries",
            get(list_handler).post(create_handler),
        )
        .route("/property-inquiries/:id/status", put(status_handler))
}

#[tracing::instrument(skip(state, inquiry), fields(property_id = %inquiry.property_id))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(inquiry): ApiJson<NewInquiry>,
) -> ApiResult<(StatusCode, Json<Inquiry>)> {
    inquiry.validate()?;
    let inquiry = state
        .store
        .create_inquiry(inquiry.normalized().into_inquiry(Utc::now()))
        .await?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<InquiryFilter>,
) -> ApiResult<Json<Vec<Inquiry>>> {
    Ok(Json(state.store.list_inquiries(&filter).await?))
}

#[tracing::instrument(skip(state))]
async fn status_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<StatusUpdate<RequestStatus>>,
) -> ApiResult<Json<Inquiry>> {
    state
        .store
        .set_inquiry_status(id, update.status)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Inquiry"))
}
