//! Error catalog and the mapping of domain errors to Problem responses.

use axum::http::StatusCode;

use crate::api::problem::{ErrDef, Problem, ValidationViolation};
use crate::auth::AuthError;
use crate::domain::error::DomainError;
use crate::domain::model::Role;
use crate::domain::odd_numbers::OddNumbersError;

macro_rules! err_def {
    ($name:ident, $status:ident, $title:literal, $code:literal) => {
        pub const $name: ErrDef = ErrDef {
            status: StatusCode::$status,
            title: $title,
            code: $code,
        };
    };
}

err_def!(INVALID_RANGE, BAD_REQUEST, "Invalid Range", "PARITY_INVALID_RANGE");
err_def!(SUM_EXCEEDS_LIMIT, BAD_REQUEST, "Sum Exceeds Limit", "PARITY_SUM_EXCEEDS_LIMIT");
err_def!(RANGE_TOO_WIDE, UNPROCESSABLE_ENTITY, "Range Too Wide", "PARITY_RANGE_TOO_WIDE");
err_def!(USER_NOT_FOUND, NOT_FOUND, "User Not Found", "USERS_NOT_FOUND");
err_def!(EMAIL_CONFLICT, CONFLICT, "Email Already Registered", "USERS_EMAIL_CONFLICT");
err_def!(USER_VALIDATION, UNPROCESSABLE_ENTITY, "Validation Failed", "USERS_VALIDATION");
err_def!(USERS_INTERNAL, INTERNAL_SERVER_ERROR, "Internal Server Error", "USERS_INTERNAL");
err_def!(UNAUTHENTICATED, UNAUTHORIZED, "Unauthorized", "AUTH_UNAUTHENTICATED");
err_def!(FORBIDDEN, FORBIDDEN, "Forbidden", "AUTH_FORBIDDEN");
err_def!(INACTIVE_USER, BAD_REQUEST, "Inactive User", "AUTH_INACTIVE_USER");
err_def!(AUTH_INTERNAL, INTERNAL_SERVER_ERROR, "Internal Server Error", "AUTH_INTERNAL");
err_def!(INVALID_QUERY, UNPROCESSABLE_ENTITY, "Invalid Query", "REQUEST_INVALID_QUERY");
err_def!(INVALID_PATH, UNPROCESSABLE_ENTITY, "Invalid Path", "REQUEST_INVALID_PATH");
err_def!(INVALID_BODY, UNPROCESSABLE_ENTITY, "Invalid Body", "REQUEST_INVALID_BODY");
err_def!(HEALTH_UNAVAILABLE, SERVICE_UNAVAILABLE, "Service Unavailable", "HEALTH_UNAVAILABLE");
err_def!(ROUTE_NOT_FOUND, NOT_FOUND, "Not Found", "ROUTE_NOT_FOUND");

pub const CREDENTIALS_DETAIL: &str = "Could not validate credentials";

/// `WWW-Authenticate` value for a route guarded by `required` scopes.
#[must_use]
pub fn bearer_challenge(required: &[Role]) -> String {
    if required.is_empty() {
        return "Bearer".to_owned();
    }
    let scopes: Vec<&str> = required.iter().copied().map(Role::as_str).collect();
    format!("Bearer scope=\"{}\"", scopes.join(" "))
}

/// Render an error as a Problem for the request at `instance`.
pub trait ToProblem {
    fn to_problem(&self, instance: &str) -> Problem;
}

fn current_trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Attach the request path and current span id.
pub fn with_context(problem: Problem, instance: &str) -> Problem {
    let problem = problem.with_instance(instance);
    match current_trace_id() {
        Some(tid) => problem.with_trace_id(tid),
        None => problem,
    }
}

impl ToProblem for OddNumbersError {
    fn to_problem(&self, instance: &str) -> Problem {
        let def = match self {
            Self::InvalidRange { .. } => INVALID_RANGE,
            Self::SumExceedsLimit { .. } => SUM_EXCEEDS_LIMIT,
        };
        with_context(def.as_problem(self.to_string()), instance)
    }
}

impl ToProblem for DomainError {
    fn to_problem(&self, instance: &str) -> Problem {
        let problem = match self {
            Self::UserNotFound { .. } => USER_NOT_FOUND.as_problem(self.to_string()),
            Self::EmailAlreadyExists { .. } => EMAIL_CONFLICT.as_problem(self.to_string()),
            Self::Validation { violations } => USER_VALIDATION
                .as_problem(self.to_string())
                .with_errors(
                    violations
                        .iter()
                        .map(|v| ValidationViolation {
                            field: v.field.clone(),
                            message: v.message.clone(),
                            code: None,
                        })
                        .collect(),
                ),
            Self::Database { message } => {
                // Internal details stay in the log.
                tracing::error!(error = %message, "database error while processing users");
                USERS_INTERNAL.as_problem("Internal server error while processing users")
            }
        };
        with_context(problem, instance)
    }
}

impl ToProblem for AuthError {
    fn to_problem(&self, instance: &str) -> Problem {
        let problem = match self {
            Self::Unauthenticated
            | Self::InvalidToken(_)
            | Self::TokenExpired
            | Self::UnknownSubject
            | Self::Disabled => UNAUTHENTICATED
                .as_problem(CREDENTIALS_DETAIL)
                .with_challenge("Bearer"),
            Self::Forbidden { required } => FORBIDDEN
                .as_problem(self.to_string())
                .with_challenge(bearer_challenge(required)),
            Self::InactiveUser => INACTIVE_USER.as_problem(self.to_string()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "authentication failed internally");
                AUTH_INTERNAL.as_problem("Internal server error")
            }
        };
        with_context(problem, instance)
    }
}
