use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri};
use tracing::warn;

use crate::api::problem::Problem;
use crate::api::rest::dto::{HealthResponse, RootResponse};
use crate::api::rest::error::{HEALTH_UNAVAILABLE, with_context};
use crate::api::rest::state::AppState;

pub async fn root(Extension(state): Extension<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {}", state.api.project_name),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        docs: state.api.prefix.clone(),
    })
}

/// Readiness: the database must answer.
pub async fn health(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<HealthResponse>, Problem> {
    if let Err(e) = state.users.ping().await {
        warn!(error = %e, "readiness check failed");
        return Err(with_context(
            HEALTH_UNAVAILABLE.as_problem("Database is not reachable"),
            uri.path(),
        ));
    }
    Ok(Json(HealthResponse {
        status: "healthy".to_owned(),
    }))
}

/// Liveness.
pub async fn healthz() -> &'static str {
    "ok"
}
