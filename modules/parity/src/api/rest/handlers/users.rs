use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::info;

use crate::api::problem::Problem;
use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UpdateMeReq, UpdateUserReq, UserDto};
use crate::api::rest::error::ToProblem;
use crate::api::rest::extract::{AdminScope, CurrentUser, ValidJson, ValidPath, ValidQuery};
use crate::api::rest::state::AppState;

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    ValidQuery(query): ValidQuery<ListUsersQuery>,
) -> Result<Json<Vec<UserDto>>, Problem> {
    let users = state
        .users
        .list_users(query.skip, query.limit)
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    ValidJson(req): ValidJson<CreateUserReq>,
) -> Result<impl IntoResponse, Problem> {
    let user = state
        .users
        .create_user(req.into())
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    info!(user.id = user.id, "user created over REST");

    let location = format!("{}/users/{}", state.api.prefix, user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserDto::from(user)),
    ))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<UserDto>, Problem> {
    let user = state
        .users
        .get_user(id)
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    Ok(Json(user.into()))
}

pub async fn read_me(CurrentUser { user, .. }: CurrentUser) -> Json<UserDto> {
    Json(user.into())
}

pub async fn update_me(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    CurrentUser { user: me, .. }: CurrentUser,
    ValidJson(req): ValidJson<UpdateMeReq>,
) -> Result<Json<UserDto>, Problem> {
    let user = state
        .users
        .update_user(me.id, req.into())
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    CurrentUser { user: admin, .. }: CurrentUser<AdminScope>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(req): ValidJson<UpdateUserReq>,
) -> Result<Json<UserDto>, Problem> {
    info!(admin.id = admin.id, user.id = id, "admin updating user");
    let user = state
        .users
        .update_user(id, req.into())
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    CurrentUser { user: admin, .. }: CurrentUser<AdminScope>,
    ValidPath(id): ValidPath<i64>,
) -> Result<StatusCode, Problem> {
    info!(admin.id = admin.id, user.id = id, "admin deleting user");
    state
        .users
        .delete_user(id)
        .await
        .map_err(|e| e.to_problem(uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}
