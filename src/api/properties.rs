use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::error::{ApiResult, AppError};
use crate::models::{NewProperty, Property, PropertyPatch, Viewer};
use crate::store::{PropertyFilter, SearchParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(search_handler).post(create_handler))
        .route(
            "/properties/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub viewer: Viewer,
}

impl ViewerQuery {
    fn present(&self, property: Property) -> Property {
        match self.viewer {
            Viewer::Partner => property,
            Viewer::Public => property.without_contact(),
        }
    }
}

#[tracing::instrument(skip(state))]
async fn search_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
    ApiQuery(viewer): ApiQuery<ViewerQuery>,
) -> ApiResult<Json<Vec<Property>>> {
    let filter = PropertyFilter::try_from(params)?;
    let properties = state.store.search_properties(&filter).await?;
    tracing::debug!(count = properties.len(), "search complete");

    Ok(Json(
        properties.into_iter().map(|p| viewer.present(p)).collect(),
    ))
}

#[tracing::instrument(skip(state, property), fields(title = %property.title))]
async fn create_handler(
    State(state): State<AppState>,
    ApiJson(property): ApiJson<NewProperty>,
) -> ApiResult<(StatusCode, Json<Property>)> {
    property.validate()?;
    let property = state.store.create_property(property.normalized()).await?;
    tracing::info!(property_id = %property.id, "property listed");

    Ok((StatusCode::CREATED, Json(property)))
}

#[tracing::instrument(skip(state))]
async fn get_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(viewer): ApiQuery<ViewerQuery>,
) -> ApiResult<Json<Property>> {
    let property = state
        .store
        .get_property(id)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    Ok(Json(viewer.present(property)))
}

#[tracing::instrument(skip(state, patch))]
async fn update_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<PropertyPatch>,
) -> ApiResult<Json<Property>> {
    let patch = patch.normalized();
    patch.validate()?;

    let updated = if patch.is_empty() {
        state.store.get_property(id).await?
    } else {
        state.store.update_property(id, patch).await?
    };

    updated
        .map(Json)
        .ok_or(AppError::NotFound("Property"))
}

#[tracing::instrument(skip(state))]
async fn delete_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if state.store.delete_property(id).await? {
        tracing::info!(property_id = %id, "property removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Property"))
    }
}
