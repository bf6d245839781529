pub mod config;
pub mod movement;
pub mod query;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::ServerConfig;
use movement::MovementCoordinator;
use storage::Storage;

/// Shared application state passed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    /// Record-movement coordinator, backed by the same SQLite storage.
    pub mover: MovementCoordinator<Storage>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<ServerConfig>, storage: Arc<Storage>) -> Self {
        let mover = MovementCoordinator::new((*storage).clone());
        Self {
            config,
            storage,
            mover,
            started_at: std::time::Instant::now(),
        }
    }
}
