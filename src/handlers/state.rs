//! Shared application state threaded through the router.

use anyhow::Result;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenKeys};
use crate::config::ServerConfig;
use crate::db::Database;

/// Everything a handler needs: the database handle, config and auth helpers.
pub struct AppContext {
    pub db: Database,
    pub config: ServerConfig,
    pub token_keys: TokenKeys,
    pub hasher: PasswordHasher,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    /// Open the configured database and assemble the shared state.
    pub fn new(config: ServerConfig) -> Result<AppState> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(db, config))
    }

    /// Assemble state around an existing database handle.
    pub fn with_database(db: Database, config: ServerConfig) -> AppState {
        let token_keys = TokenKeys::new(&config.jwt_secret, config.jwt_ttl_secs);
        let hasher = PasswordHasher::new(config.password_pepper.clone());
        Arc::new(AppContext {
            db,
            config,
            token_keys,
            hasher,
        })
    }
}
