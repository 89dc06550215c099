//! Everything `create_server` needs besides the health state.

use std::net::SocketAddr;

use learning_backend::inbound::http::session_config::SessionSettings;
use learning_backend::outbound::persistence::DbPool;

/// Backing store for the repositories.
#[derive(Clone, Default)]
pub enum Storage {
    /// Process-local tables; contents vanish on restart.
    #[default]
    Memory,
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
}

/// Validated startup settings for the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
}

impl ServerConfig {
    /// Serve from memory on `bind_addr` until storage is chosen.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            storage: Storage::default(),
        }
    }

    #[must_use]
    pub fn with_storage(self, storage: Storage) -> Self {
        Self { storage, ..self }
    }
}
