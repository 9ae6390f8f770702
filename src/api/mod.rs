use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::store::MarketStore;

mod agreements;
mod calculator;
pub mod extract;
mod health;
mod inquiries;
mod legal;
mod movers;
mod partners;
mod properties;
mod seed;
mod societies;
mod transfers;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(properties::router())
        .merge(inquiries::router())
        .merge(partners::router())
        .merge(legal::router())
        .merge(movers::router())
        .merge(agreements::router())
        .merge(transfers::router())
        .merge(societies::router())
        .merge(calculator::router())
        .merge(seed::router())
        .with_state(state)
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `?status=` on the intake list endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct StatusQuery<S> {
    pub status: Option<S>,
}
