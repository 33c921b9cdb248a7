//! HTTP host: state wiring, middleware stack and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request, Response, StatusCode};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use tracing::{Span, error, info};

use crate::api::rest::{AppState, register_routes};
use crate::auth::TokenVerifier;
use crate::config::{AppConfig, ServerConfig};
use crate::domain::service::{ServiceConfig, UsersService};
use crate::infra::db::connect_and_migrate;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;
use crate::signals::wait_for_shutdown;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wire the repository, service and token verifier for `db`.
///
/// # Errors
/// Returns an error when auth is enabled without a signing secret.
pub fn build_state(db: DatabaseConnection, config: &AppConfig) -> anyhow::Result<AppState> {
    let repo = Arc::new(SeaOrmUsersRepository::new(db));
    let users = UsersService::new(
        repo,
        ServiceConfig {
            default_page_size: config.api.default_page_size,
            max_page_size: config.api.max_page_size,
        },
    );
    let verifier = TokenVerifier::from_config(&config.auth)?;
    Ok(AppState::new(users, verifier, config.api.clone()))
}

/// Routes wrapped in the middleware stack.
///
/// Requests flow: `SetRequestId` -> `PropagateRequestId` -> Trace -> Timeout
/// -> `BodyLimit` -> routes.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    register_routes(state)
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

/// Connect, migrate and serve until a shutdown signal arrives.
///
/// # Errors
/// Returns an error when the database, the listener or the server fails.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind_addr))?;

    let db = connect_and_migrate(&config.database).await?;
    let state = build_state(db, config)?;
    let router = build_router(state, &config.server);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, prefix = %config.api.prefix, "HTTP server bound");

    let shutdown = async {
        if let Err(e) = wait_for_shutdown().await {
            error!(error = %e, "signal handling failed, shutting down");
        }
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
