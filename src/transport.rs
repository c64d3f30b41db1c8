use crate::protocol::{decode_frame, ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Externally observable health of the logical connection. Transitions are
/// the only failure signal the transport emits; connection errors are never
/// surfaced as hard errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Closed,
}

#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Full WebSocket URL, e.g. "ws://host:8000/ws"
    pub url: String,
    /// Liveness ping cadence while the socket is open
    pub ping_interval: Duration,
    /// Fixed delay before each reconnect attempt; no backoff, no cap
    pub reconnect_delay: Duration,
}

impl TransportOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Handle to the transport worker. Cloneable; all clones talk to the same
/// single logical connection (the worker task owns the socket, so a second
/// connection can never be started while one exists).
#[derive(Clone)]
pub struct TransportHandle {
    outbound_tx: mpsc::UnboundedSender<ClientMessage>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TransportHandle {
    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch connection state transitions.
    pub fn state_stream(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Fire-and-forget send. While the socket is not open this is a silent
    /// no-op; callers that care about delivery must check `state` first.
    pub fn send(&self, message: ClientMessage) {
        if self.state() != ConnectionState::Connected {
            debug!("Transport not connected, dropping outbound message");
            return;
        }
        if self.outbound_tx.send(message).is_err() {
            debug!("Transport worker gone, dropping outbound message");
        }
    }

    /// Deactivate the transport: cancels any pending reconnect and ping
    /// timers, closes the socket if open, and waits for the worker to stop.
    /// Once this returns, no further inbound messages are delivered.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let worker = self.worker.lock().expect("transport worker lock poisoned").take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }
}

/// Why a live connection ended.
enum ConnectionEnd {
    Lost,
    Shutdown,
}

/// Start the transport worker. Returns the handle plus the inbound message
/// stream; messages arrive in wire order and stop permanently after
/// `shutdown` completes.
pub fn start_transport(
    options: TransportOptions,
) -> (TransportHandle, mpsc::UnboundedReceiver<ServerMessage>) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = TransportWorker {
        options,
        outbound_rx,
        inbound_tx,
        state_tx,
        shutdown_rx,
    };
    let join = tokio::spawn(worker.run());

    (
        TransportHandle {
            outbound_tx,
            state_rx,
            shutdown_tx: Arc::new(shutdown_tx),
            worker: Arc::new(Mutex::new(Some(join))),
        },
        inbound_rx,
    )
}

/// Handle that reports `Connected` without a worker behind it, exposing the
/// outbound channel so tests can observe exactly what would hit the wire.
#[cfg(test)]
pub(crate) fn test_handle() -> (TransportHandle, mpsc::UnboundedReceiver<ClientMessage>) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    // The receiver keeps reporting Connected after the sender drops.
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let (shutdown_tx, _) = watch::channel(false);
    (
        TransportHandle {
            outbound_tx,
            state_rx,
            shutdown_tx: Arc::new(shutdown_tx),
            worker: Arc::new(Mutex::new(None)),
        },
        outbound_rx,
    )
}

struct TransportWorker {
    options: TransportOptions,
    outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    inbound_tx: mpsc::UnboundedSender<ServerMessage>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TransportWorker {
    fn shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }

    async fn run(mut self) {
        self.set_state(ConnectionState::Connecting);

        loop {
            if self.shutting_down() {
                break;
            }

            match connect_async(self.options.url.as_str()).await {
                Ok((socket, _)) => {
                    info!("Transport connected to {}", self.options.url);
                    self.set_state(ConnectionState::Connected);
                    if let ConnectionEnd::Shutdown = self.drive_connection(socket).await {
                        break;
                    }
                    info!("Transport connection lost, scheduling reconnect");
                }
                Err(err) => {
                    warn!("Transport connect failed: {}", err);
                }
            }

            if self.shutting_down() {
                break;
            }
            self.set_state(ConnectionState::Reconnecting);

            // Single fixed-delay reconnect, cancellable by shutdown.
            tokio::select! {
                _ = tokio::time::sleep(self.options.reconnect_delay) => {}
                _ = self.shutdown_rx.changed() => break,
            }
        }

        self.set_state(ConnectionState::Closed);
        info!("Transport worker stopped");
    }

    /// Drive one open connection until it drops or shutdown is requested.
    /// The ping interval lives in this scope, so it cannot outlive the
    /// connection it belongs to.
    async fn drive_connection(
        &mut self,
        socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> ConnectionEnd {
        let (mut sink, mut stream) = socket.split();

        let mut ping = tokio::time::interval_at(
            tokio::time::Instant::now() + self.options.ping_interval,
            self.options.ping_interval,
        );

        loop {
            tokio::select! {
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(message) = decode_frame(&text) {
                                if self.inbound_tx.send(message).is_err() {
                                    // Consumer dropped the stream; treat it
                                    // like a deactivation.
                                    return ConnectionEnd::Shutdown;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return ConnectionEnd::Lost;
                        }
                        Some(Ok(_)) => {
                            // Binary/ping/pong frames carry nothing for us.
                        }
                        Some(Err(err)) => {
                            warn!("Transport read error: {}", err);
                            return ConnectionEnd::Lost;
                        }
                    }
                }
                outbound = self.outbound_rx.recv() => {
                    let Some(message) = outbound else {
                        // Every handle is gone; nothing can reactivate us.
                        let _ = sink.send(Message::Close(None)).await;
                        return ConnectionEnd::Shutdown;
                    };
                    match serde_json::to_string(&message) {
                        Ok(text) => {
                            if let Err(err) = sink.send(Message::Text(text)).await {
                                warn!("Transport write error: {}", err);
                                return ConnectionEnd::Lost;
                            }
                        }
                        Err(err) => warn!("Failed to encode outbound message: {}", err),
                    }
                }
                _ = ping.tick() => {
                    match serde_json::to_string(&ClientMessage::Ping) {
                        Ok(text) => {
                            if let Err(err) = sink.send(Message::Text(text)).await {
                                warn!("Transport ping failed: {}", err);
                                return ConnectionEnd::Lost;
                            }
                        }
                        Err(err) => warn!("Failed to encode ping: {}", err),
                    }
                }
                _ = self.shutdown_rx.changed() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return ConnectionEnd::Shutdown;
                }
            }
        }
    }
}
