//! Request extractors that answer with Problem responses.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::problem::Problem;
use crate::api::rest::error::{
    INVALID_BODY, INVALID_PATH, INVALID_QUERY, ToProblem, bearer_challenge, with_context,
};
use crate::api::rest::state::AppState;
use crate::auth::{AuthError, authorize, bearer_token};
use crate::domain::error::DomainError;
use crate::domain::model::{Role, User};

/// Query string extractor; a rejection becomes 422 `REQUEST_INVALID_QUERY`.
#[derive(Debug, Clone, Copy)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(with_context(
                INVALID_QUERY.as_problem(rejection.body_text()),
                parts.uri.path(),
            )),
        }
    }
}

/// Path parameter extractor; a rejection becomes 422 `REQUEST_INVALID_PATH`.
#[derive(Debug, Clone, Copy)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(with_context(
                INVALID_PATH.as_problem(rejection.body_text()),
                parts.uri.path(),
            )),
        }
    }
}

/// JSON body extractor; a rejection becomes 422 `REQUEST_INVALID_BODY`.
#[derive(Debug, Clone, Copy)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(with_context(
                INVALID_BODY.as_problem(rejection.body_text()),
                &instance,
            )),
        }
    }
}

/// Scopes a route demands from the bearer token.
pub trait ScopeRequirement {
    const REQUIRED: &'static [Role];
}

/// Any authenticated user.
#[derive(Debug)]
pub struct UserScope;

impl ScopeRequirement for UserScope {
    const REQUIRED: &'static [Role] = &[Role::User];
}

/// Administrators only.
#[derive(Debug)]
pub struct AdminScope;

impl ScopeRequirement for AdminScope {
    const REQUIRED: &'static [Role] = &[Role::Admin];
}

/// The active user behind the request's bearer token.
///
/// Checks run in order: token (401), subject lookup (401), scopes (403),
/// activation (400).
#[derive(Debug)]
pub struct CurrentUser<R = UserScope> {
    pub user: User,
    _scope: PhantomData<fn() -> R>,
}

impl<S, R> FromRequestParts<S> for CurrentUser<R>
where
    R: ScopeRequirement,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_owned();
        resolve_user(parts, R::REQUIRED)
            .await
            .map(|user| Self {
                user,
                _scope: PhantomData,
            })
            .map_err(|e| {
                let problem = e.to_problem(&instance);
                match e {
                    AuthError::Forbidden { .. }
                    | AuthError::InactiveUser
                    | AuthError::Internal(_) => problem,
                    _ => problem.with_challenge(bearer_challenge(R::REQUIRED)),
                }
            })
    }
}

async fn resolve_user(parts: &Parts, required: &[Role]) -> Result<User, AuthError> {
    let state = parts
        .extensions
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or_else(|| AuthError::Internal("application state is not installed".to_owned()))?;
    let verifier = state.verifier.as_ref().ok_or(AuthError::Disabled)?;

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::Unauthenticated)?;

    let claims = verifier.verify(token)?;
    let user_id = claims.user_id()?;

    let user = match state.users.get_user(user_id).await {
        Ok(user) => user,
        Err(DomainError::UserNotFound { .. }) => {
            debug!(user.id = user_id, "token subject does not exist");
            return Err(AuthError::UnknownSubject);
        }
        Err(e) => return Err(AuthError::Internal(e.to_string())),
    };

    authorize(&claims.roles(), required)?;

    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }
    Ok(user)
}
