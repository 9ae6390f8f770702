use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::error::{ApiResult, AppError};
use crate::models::{NewSociety, Society};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/societies", get(list_handler).post(create_handler))
        .route(
            "/societies/:id",
            get(get_handler).put(replace_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
struct SocietyQuery {
    city: Option<String>,
}

#[tracing::instrument(skip(state))]
async fn list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SocietyQuery>,
) -> ApiResult<Json<Vec<Society>>> {
    let city = query.city.as_deref().filter(|c| !c.trim().is_empty());
    Ok(Json(state.store.list_societies(city).await?))
}

#[tracing::instrument(skip(state, society), fields(name = %society.name))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(society): ApiJson<NewSociety>,
) -> ApiResult<(StatusCode, Json<Society>)> {
    society.validate(Utc::now())?;
    let society = state.store.create_society(society.normalized()).await?;

    Ok((StatusCode::CREATED, Json(society)))
}

#[tracing::instrument(skip(state))]
async fn get_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Society>> {
    state
        .store
        .get_society(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Society"))
}

#[tracing::instrument(skip(state, society))]
async fn replace_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(society): ApiJson<NewSociety>,
) -> ApiResult<Json<Society>> {
    society.validate(Utc::now())?;
    state
        .store
        .replace_society(id, society.normalized())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Society"))
}

#[tracing::instrument(skip(state))]
async fn delete_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if state.store.delete_society(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Society"))
    }
}
