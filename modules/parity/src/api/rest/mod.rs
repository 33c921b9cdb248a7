pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::register_routes;
pub use state::AppState;
