//! Shared application state.
//!
//! One `Arc<AppState>` is handed to every route and middleware. Each
//! field is cheap to clone or internally shared already.

use std::sync::Arc;

use souk_db::Database;

use crate::config::ServerConfig;
use crate::notify::Mailer;
use crate::session::SessionStore;

/// Everything a handler can reach.
pub struct AppState {
    /// Database handle (pooled, clone-cheap).
    pub db: Database,

    /// In-memory session store.
    pub sessions: SessionStore,

    /// Outbound mail seam. `LogMailer` in this deployment.
    pub mailer: Arc<dyn Mailer>,

    /// Loaded server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Creates the shared state from its parts.
    pub fn new(db: Database, mailer: Arc<dyn Mailer>, config: ServerConfig) -> Self {
        AppState {
            db,
            sessions: SessionStore::new(),
            mailer,
            config,
        }
    }
}
