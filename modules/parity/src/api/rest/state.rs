use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::ApiConfig;
use crate::domain::service::UsersService;

/// Shared state handed to every handler through a request extension.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UsersService>,
    /// `None` when authentication is disabled.
    pub verifier: Option<Arc<TokenVerifier>>,
    pub api: Arc<ApiConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(users: UsersService, verifier: Option<TokenVerifier>, api: ApiConfig) -> Self {
        Self {
            users: Arc::new(users),
            verifier: verifier.map(Arc::new),
            api: Arc::new(api),
        }
    }
}
