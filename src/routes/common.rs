//! Operational endpoints: health, readiness, version.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP",
        database: None,
    })
}

/// Fails with the store error (enveloped as a database failure) when the pool
/// cannot serve a trivial query.
async fn ready(State(state): State<AppState>) -> Result<Json<HealthStatus>, AppError> {
    state.students.store().ping().await?;
    Ok(Json(HealthStatus {
        status: "UP",
        database: Some("UP"),
    }))
}

async fn version() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
