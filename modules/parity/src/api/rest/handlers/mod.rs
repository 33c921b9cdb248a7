pub mod health;
pub mod odd_numbers;
pub mod users;

use axum::extract::OriginalUri;

use crate::api::problem::Problem;
use crate::api::rest::error::{ROUTE_NOT_FOUND, with_context};

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Problem {
    with_context(
        ROUTE_NOT_FOUND.as_problem(format!("No route matches '{}'", uri.path())),
        uri.path(),
    )
}
