#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{Method, StatusCode, header};
use parity::domain::model::Role;
use serde_json::json;

use common::{app, get, mint_token, seed_user, send};

#[tokio::test]
async fn create_normalizes_and_returns_location() {
    let app = app().await;

    let r = send(
        &app.router,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "name": "  jOHN ", "surname": "doe", "email": " John.Doe@Example.COM " })),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED);
    let id = r.body["user_id"].as_i64().unwrap();
    assert_eq!(r.body["name"], "John");
    assert_eq!(r.body["surname"], "Doe");
    assert_eq!(r.body["email"], "john.doe@example.com");
    assert_eq!(r.body["role"], "user");
    assert_eq!(r.body["is_active"], true);
    assert_eq!(
        r.headers.get(header::LOCATION).unwrap(),
        format!("/api/v1/users/{id}").as_str()
    );

    let r = get(&app.router, &format!("/api/v1/users/{id}")).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["email"], "john.doe@example.com");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = app().await;
    let body = json!({ "name": "Ada", "surname": "Lovelace", "email": "ada@example.com" });

    let r = send(&app.router, Method::POST, "/api/v1/users", None, Some(body)).await;
    assert_eq!(r.status, StatusCode::CREATED);

    let again = json!({ "name": "Grace", "surname": "Hopper", "email": "ADA@example.com" });
    let r = send(&app.router, Method::POST, "/api/v1/users", None, Some(again)).await;
    assert_eq!(r.status, StatusCode::CONFLICT);
    assert_eq!(r.body["code"], "USERS_EMAIL_CONFLICT");
    assert_eq!(r.body["detail"], "User with email ada@example.com already exists");
}

#[tokio::test]
async fn invalid_input_lists_violations() {
    let app = app().await;

    let r = send(
        &app.router,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "name": "A", "surname": "B2", "email": "nope" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["code"], "USERS_VALIDATION");
    let fields: Vec<&str> = r.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"surname"));
    assert!(fields.contains(&"email"));

    let r = send(
        &app.router,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "name": "Anna", "surname": "anna", "email": "anna@example.com" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["errors"][0]["field"], "surname");
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    let app = app().await;
    let r = send(
        &app.router,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "name": "Ada" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["code"], "REQUEST_INVALID_BODY");
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let app = app().await;
    let r = get(&app.router, "/api/v1/users/999").await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["detail"], "User with ID 999 not found");

    let r = get(&app.router, "/api/v1/users/abc").await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_pages_by_id() {
    let app = app().await;
    for (name, email) in [
        ("Alice", "alice@example.com"),
        ("Bob", "bob@example.com"),
        ("Carol", "carol@example.com"),
    ] {
        seed_user(&app.state, name, "Tester", email, Role::User).await;
    }

    let r = get(&app.router, "/api/v1/users").await;
    assert_eq!(r.body.as_array().unwrap().len(), 3);

    let r = get(&app.router, "/api/v1/users?skip=1&limit=1").await;
    let page = r.body.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["name"], "Bob");

    let r = get(&app.router, "/api/v1/users?limit=0").await;
    assert_eq!(r.body.as_array().unwrap().len(), 1);

    let r = get(&app.router, "/api/v1/users?skip=-1").await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);

    let r = get(&app.router, "/api/v1/users?skip=18446744073709551615").await;
    assert_eq!(r.status, StatusCode::OK);
    assert!(r.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn collection_accepts_trailing_slash() {
    let app = app().await;
    seed_user(&app.state, "Alice", "Tester", "alice@example.com", Role::User).await;

    let r = get(&app.router, "/api/v1/users/").await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body.as_array().unwrap().len(), 1);

    let r = send(
        &app.router,
        Method::POST,
        "/api/v1/users/",
        None,
        Some(json!({ "name": "Bob", "surname": "Builder", "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED);
}

#[tokio::test]
async fn current_user_round_trip() {
    let app = app().await;
    let user = seed_user(&app.state, "Ada", "Lovelace", "ada@example.com", Role::User).await;
    let token = mint_token(user.id, &["user"]);

    let r = send(&app.router, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["user_id"], user.id);

    let r = send(
        &app.router,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "surname": "byron" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["surname"], "Byron");
    assert_eq!(r.body["name"], "Ada");
}

#[tokio::test]
async fn current_user_cannot_change_role() {
    let app = app().await;
    let user = seed_user(&app.state, "Ada", "Lovelace", "ada@example.com", Role::User).await;
    let token = mint_token(user.id, &["user"]);

    let r = send(
        &app.router,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["code"], "REQUEST_INVALID_BODY");
}

#[tokio::test]
async fn admin_patches_and_deletes() {
    let app = app().await;
    let admin = seed_user(&app.state, "Root", "Admin", "root@example.com", Role::Admin).await;
    let target = seed_user(&app.state, "Bob", "Builder", "bob@example.com", Role::User).await;
    let token = mint_token(admin.id, &["admin"]);
    let uri = format!("/api/v1/users/{}", target.id);

    let r = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "role": "admin", "is_active": false })),
    )
    .await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["role"], "admin");
    assert_eq!(r.body["is_active"], false);

    let r = send(&app.router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(r.status, StatusCode::NO_CONTENT);
    assert!(r.body.is_null());

    let r = get(&app.router, &uri).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);

    let r = send(&app.router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_rejects_taken_email() {
    let app = app().await;
    let admin = seed_user(&app.state, "Root", "Admin", "root@example.com", Role::Admin).await;
    let target = seed_user(&app.state, "Bob", "Builder", "bob@example.com", Role::User).await;
    let token = mint_token(admin.id, &["admin"]);

    let r = send(
        &app.router,
        Method::PATCH,
        &format!("/api/v1/users/{}", target.id),
        Some(&token),
        Some(json!({ "email": "root@example.com" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::CONFLICT);

    // Keeping one's own email is not a conflict.
    let r = send(
        &app.router,
        Method::PATCH,
        &format!("/api/v1/users/{}", target.id),
        Some(&token),
        Some(json!({ "email": "bob@example.com", "name": "robert" })),
    )
    .await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["name"], "Robert");
}
