use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::state::AppState;
use crate::ws::{Connection, ConnectionRegistry};

/// Run the actor-per-connection pattern for an accepted WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from the connection's bounded queue
/// - Reader loop: discards client payloads and waits for disconnect
///
/// The connection is registered before anything is sent to it and
/// unregistered when the client goes away or a write fails.
pub async fn run_connection(socket: WebSocket, state: AppState, peer: SocketAddr) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (connection, rx) = Connection::open(state.broadcast.connection_buffer);
    let connection_id = connection.id();

    state.connections.register(connection.clone());

    tracing::info!(
        connection_id = %connection_id,
        peer = %peer,
        "WebSocket connection opened"
    );

    let send_timeout = Duration::from_secs(state.broadcast.send_timeout_secs.max(1));
    let writer_handle = tokio::spawn(writer_task(
        ws_sender,
        rx,
        state.connections.clone(),
        connection.clone(),
        send_timeout,
    ));

    loop {
        tokio::select! {
            _ = connection.closed() => {
                tracing::debug!(connection_id = %connection_id, "Connection closed by server");
                break;
            }
            next = ws_receiver.next() => match next {
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(
                        connection_id = %connection_id,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
                Some(Ok(_)) => {
                    // Clients have nothing to say on this channel; pings are
                    // answered by the protocol layer
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
                None => {
                    tracing::info!(connection_id = %connection_id, "WebSocket stream ended");
                    break;
                }
            }
        }
    }

    state.connections.unregister(&connection_id);
    writer_handle.abort();

    tracing::info!(
        connection_id = %connection_id,
        peer = %peer,
        "WebSocket connection closed"
    );
}

/// Writer task: drains the connection's queue into the WebSocket sink.
/// A failed or timed-out write drops the connection from the registry.
async fn writer_task<S>(
    mut ws_sender: S,
    mut rx: mpsc::Receiver<Message>,
    registry: ConnectionRegistry,
    connection: Connection,
    send_timeout: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    while let Some(msg) = rx.recv().await {
        let failure = match timeout(send_timeout, ws_sender.send(msg)).await {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "send timed out".to_string(),
        };
        tracing::warn!(
            connection_id = %connection.id(),
            error = %failure,
            "WebSocket send failed"
        );
        break;
    }

    registry.unregister(&connection.id());
    connection.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::ConnectionStatus;
    use futures_util::sink;

    fn registered_connection(registry: &ConnectionRegistry) -> (Connection, mpsc::Receiver<Message>) {
        let (connection, rx) = Connection::open(4);
        registry.register(connection.clone());
        connection.try_deliver(Message::Text("{}".into())).unwrap();
        (connection, rx)
    }

    #[tokio::test]
    async fn test_failed_write_closes_connection() {
        let registry = ConnectionRegistry::new();
        let (connection, rx) = registered_connection(&registry);

        let broken = Box::pin(sink::unfold((), |(), _msg: Message| async {
            Err::<(), _>("broken pipe")
        }));
        writer_task(broken, rx, registry.clone(), connection.clone(), Duration::from_secs(5)).await;

        assert!(!registry.contains(&connection.id()));
        assert_eq!(connection.status(), ConnectionStatus::Closed);
    }

    #[tokio::test]
    async fn test_stalled_write_times_out() {
        let registry = ConnectionRegistry::new();
        let (connection, rx) = registered_connection(&registry);

        let stalled = Box::pin(sink::unfold((), |(), _msg: Message| {
            std::future::pending::<Result<(), &'static str>>()
        }));
        tokio::time::timeout(
            Duration::from_secs(2),
            writer_task(stalled, rx, registry.clone(), connection.clone(), Duration::from_millis(50)),
        )
        .await
        .expect("writer should give up after the send timeout");

        assert!(!registry.contains(&connection.id()));
        assert_eq!(connection.status(), ConnectionStatus::Closed);
    }

    #[tokio::test]
    async fn test_healthy_writer_forwards_in_order() {
        let registry = ConnectionRegistry::new();
        let (connection, rx) = Connection::open(4);
        registry.register(connection.clone());
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel::<Message>();
        let collecting = Box::pin(sink::unfold(sink_tx, |tx, msg: Message| async move {
            tx.send(msg).map(|()| tx).map_err(|_| "receiver dropped")
        }));

        let writer = tokio::spawn(writer_task(
            collecting,
            rx,
            registry.clone(),
            connection.clone(),
            Duration::from_secs(5),
        ));
        connection.try_deliver(Message::Text("one".into())).unwrap();
        connection.try_deliver(Message::Text("two".into())).unwrap();

        assert_eq!(sink_rx.recv().await, Some(Message::Text("one".into())));
        assert_eq!(sink_rx.recv().await, Some(Message::Text("two".into())));
        assert!(registry.contains(&connection.id()));
        writer.abort();
    }
}
