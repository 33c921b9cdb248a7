#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use parity::api::rest::AppState;
use parity::auth::Claims;
use parity::config::{AppConfig, MEMORY_DSN};
use parity::domain::model::{NewUser, Role, User};
use parity::infra::db::connect_and_migrate;
use parity::secret::SecretString;
use parity::server::{build_router, build_state};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    MEMORY_DSN.clone_into(&mut cfg.database.dsn);
    cfg.auth.jwt_secret = Some(SecretString::new(SECRET));
    cfg
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: sea_orm::DatabaseConnection,
}

pub async fn app() -> TestApp {
    app_with(test_config()).await
}

pub async fn app_with(cfg: AppConfig) -> TestApp {
    let db = connect_and_migrate(&cfg.database)
        .await
        .expect("in-memory database");
    let state = build_state(db.clone(), &cfg).expect("state");
    let router = build_router(state.clone(), &cfg.server);
    TestApp { router, state, db }
}

pub fn mint_token(user_id: i64, scopes: &[&str]) -> String {
    mint_token_expiring(user_id, scopes, 3600)
}

pub fn mint_token_expiring(user_id: i64, scopes: &[&str], ttl_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: u64::try_from(exp).unwrap(),
        iss: None,
        scopes: scopes.iter().map(|s| (*s).to_owned()).collect(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn seed_user(
    state: &AppState,
    name: &str,
    surname: &str,
    email: &str,
    role: Role,
) -> User {
    state
        .users
        .create_user(NewUser {
            name: name.to_owned(),
            surname: surname.to_owned(),
            email: email.to_owned(),
            role: Some(role),
            is_active: Some(true),
        })
        .await
        .expect("seed user")
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> Reply {
    send(router, Method::GET, uri, None, None).await
}
