use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::AppState;
use crate::error::ApiResult;
use crate::seed::{self, SeedReport};

pub fn router() -> Router<AppState> {
    Router::new().route("/seed-data", post(seed_handler))
}

#[tracing::instrument(skip(state))]
async fn seed_handler(State(state): State<AppState>) -> ApiResult<Json<SeedReport>> {
    Ok(Json(seed::seed(state.store.as_ref()).await?))
}
