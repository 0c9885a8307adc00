pub mod actor;
pub mod broadcast;
pub mod handler;
pub mod protocol;

use axum::extract::ws::Message;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

/// Unforgeable identity of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Open,
    Closed,
}

/// Why a message could not be handed to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,
    #[error("connection outbound queue full")]
    Full,
}

struct Lifecycle {
    closed: AtomicBool,
    shutdown: Notify,
}

/// Handle to one live WebSocket client.
///
/// Cloning yields another handle to the same connection. Messages pushed with
/// [`Connection::try_deliver`] land in a bounded queue drained by the
/// connection's writer task.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<Message>,
    lifecycle: Arc<Lifecycle>,
}

impl Connection {
    /// Create a connection handle together with the receiving end of its
    /// outbound queue.
    pub fn open(buffer: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let connection = Self {
            id: ConnectionId::generate(),
            tx,
            lifecycle: Arc::new(Lifecycle {
                closed: AtomicBool::new(false),
                shutdown: Notify::new(),
            }),
        };
        (connection, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.lifecycle.closed.load(Ordering::Acquire) || self.tx.is_closed() {
            ConnectionStatus::Closed
        } else {
            ConnectionStatus::Open
        }
    }

    /// Queue a message without waiting.
    pub fn try_deliver(&self, msg: Message) -> Result<(), DeliveryError> {
        if self.lifecycle.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::Closed);
        }
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Mark the connection closed and wake its read loop. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.lifecycle.closed.swap(true, Ordering::AcqRel) {
            self.lifecycle.shutdown.notify_one();
        }
    }

    /// Resolves once [`Connection::close`] has been called.
    pub async fn closed(&self) {
        if self.lifecycle.closed.load(Ordering::Acquire) {
            return;
        }
        self.lifecycle.shutdown.notified().await;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

/// Connection registry: tracks every open WebSocket connection.
///
/// Cheap to clone; all clones share the same set. Safe to mutate from any
/// task while a broadcast iterates a [`ConnectionRegistry::snapshot`].
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly accepted connection. Registering the same handle again
    /// replaces the existing entry.
    pub fn register(&self, connection: Connection) {
        let id = connection.id();
        self.connections.insert(id, connection);
        tracing::debug!(
            connection_id = %id,
            connections = self.connections.len(),
            "Connection registered"
        );
    }

    /// Remove a connection and mark it closed.
    /// Returns false when it was not registered (already removed or never added).
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        match self.connections.remove(id) {
            Some((_, connection)) => {
                connection.close();
                tracing::debug!(
                    connection_id = %id,
                    connections = self.connections.len(),
                    "Connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of the registered connections.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
