use axum::extract::ws::Message;
use std::sync::{Arc, Mutex};

use super::protocol::Notification;
use super::ConnectionRegistry;

/// Fans notifications out to every registered connection.
///
/// Delivery is fire-and-forget: a connection whose queue is closed or full is
/// unregistered and the remaining connections are still served. Nothing is
/// ever reported back to the caller beyond the number of recipients.
#[derive(Clone)]
pub struct Broadcaster {
    registry: ConnectionRegistry,
    // Serializes fan-outs so every connection sees notifications in call order.
    fanout: Arc<Mutex<()>>,
}

impl Broadcaster {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            fanout: Arc::new(Mutex::new(())),
        }
    }

    /// Deliver a notification to all connections registered at the time of the call.
    /// Returns how many connections accepted the message.
    pub fn notify(&self, notification: &Notification) -> usize {
        let json = match notification.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(
                    action = ?notification.action,
                    error = %e,
                    "Failed to serialize notification"
                );
                return 0;
            }
        };
        let msg = Message::Text(json.into());

        let _guard = self.fanout.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut delivered = 0;
        for connection in self.registry.snapshot() {
            match connection.try_deliver(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        error = %e,
                        "Delivery failed, dropping connection"
                    );
                    self.registry.unregister(&connection.id());
                }
            }
        }

        tracing::debug!(
            action = ?notification.action,
            recipients = delivered,
            "Notification broadcast"
        );
        delivered
    }
}
