pub mod error;
pub mod model;
pub mod odd_numbers;
pub mod repo;
pub mod service;
pub mod validation;
