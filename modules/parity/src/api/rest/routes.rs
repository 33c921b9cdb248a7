use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers::{health, not_found, odd_numbers, users};
use crate::api::rest::state::AppState;

/// Every REST route of the service, with `state` installed as an extension.
///
/// Collection routes answer both with and without a trailing slash.
pub fn register_routes(state: AppState) -> Router {
    let prefix = state.api.prefix.clone();
    let at = |path: &str| format!("{prefix}{path}");

    let odd_numbers = get(odd_numbers::list_odd_numbers);
    let users = get(users::list_users).post(users::create_user);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/healthz", get(health::healthz))
        .route(&at("/health"), get(health::health))
        .route(&at("/odd-numbers"), odd_numbers.clone())
        .route(&at("/odd-numbers/"), odd_numbers)
        .route(
            &at("/odd-numbers/check/{number}"),
            get(odd_numbers::check_number),
        )
        .route(&at("/users"), users.clone())
        .route(&at("/users/"), users)
        .route(
            &at("/users/me"),
            get(users::read_me).put(users::update_me),
        )
        .route(
            &at("/users/{id}"),
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .fallback(not_found)
        .layer(Extension(Arc::new(state)))
}
