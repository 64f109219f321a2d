//! Shared state handed to handlers and to the authentication middleware via
//! `web::Data<AppState>`. Built once at startup from [`Config`].

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::store::{CredentialStore, InMemoryCredentialStore, InMemoryTaskStore, TaskStore};

pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub todos: Arc<dyn TaskStore>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(
        config: &Config,
        users: Arc<dyn CredentialStore>,
        todos: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            users,
            todos,
            tokens: TokenService::new(&config.jwt_secret),
            passwords: PasswordHasher::new(config.bcrypt_cost),
        }
    }

    /// State backed by fresh in-memory stores.
    pub fn in_memory(tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            users: Arc::new(InMemoryCredentialStore::new()),
            todos: Arc::new(InMemoryTaskStore::new()),
            tokens,
            passwords,
        }
    }
}
