#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Parity service: an odd-number range filter with a bounded sum, plus user
//! management over REST.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod secret;
pub mod server;
pub mod signals;

pub use config::AppConfig;
pub use domain::odd_numbers::{OddNumbersError, SUM_LIMIT, is_odd, odd_numbers_in_range};
