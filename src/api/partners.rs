use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppState, StatusQuery};
use crate::error::{ApiResult, AppError};
use crate::models::{
    BankDetailsForm, Partner, PartnerDocuments, PartnerLogin, PartnerSignup, PartnerStatus,
    StatusUpdate, WorkDetails,
};
use crate::password;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/partners", get(list_handler).post(signup_handler))
        .route("/partners/login", post(login_handler))
        .route("/partners/:id", get(get_handler))
        .route("/partners/:id/work-details", put(work_details_handler))
        .route("/partners/:id/documents", put(documents_handler))
        .route("/partners/:id/bank-details", put(bank_details_handler))
        .route("/partners/:id/status", put(status_handler))
}

fn found(partner: Option<Partner>) -> ApiResult<Json<Partner>> {
    partner.map(Json).ok_or(AppError::NotFound("Partner"))
}

/// Runs argon2 on the blocking pool.
async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(AppError::Internal)
}

async fn verify_password(password: String, stored: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || password::verify(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

#[tracing::instrument(skip_all, fields(email = %signup.email))]
async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(signup): ApiJson<PartnerSignup>,
) -> ApiResult<(StatusCode, Json<Partner>)> {
    signup.validate()?;

    let hash = hash_password(signup.password.clone()).await?;
    let partner = state
        .store
        .create_partner(Partner::new(&signup, hash, Utc::now()))
        .await?;
    tracing::info!(partner_id = %partner.id, "partner registered");

    Ok((StatusCode::CREATED, Json(partner)))
}

#[tracing::instrument(skip_all, fields(email = %login.email))]
async fn login_handler(
    State(state): State<AppState>,
    ApiJson(login): ApiJson<PartnerLogin>,
) -> ApiResult<Json<Partner>> {
    const REJECTED: AppError = AppError::Unauthorized("Invalid email or password");

    let Some(partner) = state.store.find_partner_by_email(&login.email).await? else {
        return Err(REJECTED);
    };
    if !verify_password(login.password, partner.password_hash.clone()).await? {
        tracing::warn!(partner_id = %partner.id, "wrong password");
        return Err(REJECTED);
    }

    Ok(Json(partner))
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery<PartnerStatus>>,
) -> ApiResult<Json<Vec<Partner>>> {
    Ok(Json(state.store.list_partners(query.status).await?))
}

#[tracing::instrument(skip(state))]
async fn get_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Partner>> {
    found(state.store.get_partner(id).await?)
}

#[tracing::instrument(skip(state, details))]
async fn work_details_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(details): ApiJson<WorkDetails>,
) -> ApiResult<Json<Partner>> {
    details.validate()?;
    found(state.store.save_work_details(id, details.normalized()).await?)
}

#[tracing::instrument(skip(state, documents))]
async fn documents_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(documents): ApiJson<PartnerDocuments>,
) -> ApiResult<Json<Partner>> {
    documents.validate()?;
    found(state.store.save_documents(id, documents.into_urls()).await?)
}

#[tracing::instrument(skip(state, form))]
async fn bank_details_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(form): ApiJson<BankDetailsForm>,
) -> ApiResult<Json<Partner>> {
    form.validate()?;
    found(state.store.save_bank_details(id, form.into_details()).await?)
}

#[tracing::instrument(skip(state))]
async fn status_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<StatusUpdate<PartnerStatus>>,
) -> ApiResult<Json<Partner>> {
    let partner = found(state.store.set_partner_status(id, update.status).await?)?;
    tracing::info!(status = %partner.status, "partner status changed");
    Ok(partner)
}
