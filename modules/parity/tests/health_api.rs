#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, get};

#[tokio::test]
async fn root_describes_service() {
    let app = app().await;
    let r = get(&app.router, "/").await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["message"], "Welcome to Parity Service");
    assert_eq!(r.body["docs"], "/api/v1");
    assert_eq!(r.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn readiness_and_liveness() {
    let app = app().await;

    let r = get(&app.router, "/health").await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body, json!({ "status": "healthy" }));

    let r = get(&app.router, "/api/v1/health").await;
    assert_eq!(r.status, StatusCode::OK);

    let r = get(&app.router, "/healthz").await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body, json!("ok"));
}

#[tokio::test]
async fn readiness_fails_without_database() {
    let app = app().await;
    app.db.clone().close().await.unwrap();

    let r = get(&app.router, "/health").await;
    assert_eq!(r.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(r.body["code"], "HEALTH_UNAVAILABLE");

    let r = get(&app.router, "/healthz").await;
    assert_eq!(r.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_problem() {
    let app = app().await;
    let r = get(&app.router, "/nope").await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["code"], "ROUTE_NOT_FOUND");
    assert_eq!(r.body["instance"], "/nope");
}
