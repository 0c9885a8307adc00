use crate::config::BroadcastConfig;
use crate::db::DbPool;
use crate::ws::broadcast::Broadcaster;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Open WebSocket connections
    pub connections: ConnectionRegistry,
    /// Fan-out of committed mutations to `connections`
    pub broadcaster: Broadcaster,
    /// Per-connection queue and write timeout settings
    pub broadcast: BroadcastConfig,
}

impl AppState {
    pub fn new(db: DbPool, broadcast: BroadcastConfig) -> Self {
        let connections = ConnectionRegistry::new();
        Self {
            db,
            broadcaster: Broadcaster::new(connections.clone()),
            connections,
            broadcast,
        }
    }
}
