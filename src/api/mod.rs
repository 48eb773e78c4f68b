pub mod auth;
pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::FixedOffset;
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{airphynet::AirphynetClient, config::Config};

use handlers::ApiDoc;

/// Shared per-request context. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub airphynet: AirphynetClient,
    /// Bucketing timezone, resolved once at startup.
    pub trend_tz: FixedOffset,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/devices",
            get(handlers::list_devices)
                .post(handlers::create_device)
                .put(handlers::update_device)
                .delete(handlers::delete_device),
        )
        .route("/sensors/{sensor_id}", get(handlers::get_sensor))
        .route(
            "/predictions/{sensor_id}",
            get(handlers::get_predictions).post(handlers::regenerate_predictions),
        )
        .route("/analytics", get(handlers::get_analytics))
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::save_settings),
        )
        .route("/auth/login", post(handlers::login))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { Json(api) }),
        )
}
