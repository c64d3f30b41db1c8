// Test support utilities for both unit and integration tests

use crate::models::{NotificationPayload, ProcessingItem};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// In-process WebSocket server for testing the transport and sync layers
/// without a real backend.
///
/// Accepts any number of sequential connections, pushes scripted frames to
/// whoever is connected, records every text frame a client sends, and can
/// drop connections on demand to exercise reconnect behavior.
pub struct MockServer {
    addr: SocketAddr,
    push_tx: broadcast::Sender<String>,
    kill_tx: broadcast::Sender<()>,
    received: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");

        let (push_tx, _) = broadcast::channel::<String>(64);
        let (kill_tx, _) = broadcast::channel::<()>(4);
        let received = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));

        let server = Self {
            addr,
            push_tx: push_tx.clone(),
            kill_tx: kill_tx.clone(),
            received: received.clone(),
            active: active.clone(),
            total: total.clone(),
        };

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let Ok(socket) = accept_async(stream).await else {
                    continue;
                };

                active.fetch_add(1, Ordering::SeqCst);
                total.fetch_add(1, Ordering::SeqCst);

                let mut push_rx = push_tx.subscribe();
                let mut kill_rx = kill_tx.subscribe();
                let received = received.clone();
                let active = active.clone();

                tokio::spawn(async move {
                    let (mut sink, mut stream) = socket.split();
                    loop {
                        tokio::select! {
                            frame = stream.next() => {
                                match frame {
                                    Some(Ok(Message::Text(text))) => {
                                        received.lock().unwrap().push(text);
                                    }
                                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                    Some(Ok(_)) => {}
                                }
                            }
                            pushed = push_rx.recv() => {
                                let Ok(text) = pushed else { break };
                                if sink.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                            _ = kill_rx.recv() => {
                                // Hard drop, no close handshake.
                                break;
                            }
                        }
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        server
    }

    /// WebSocket URL clients should connect to.
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Push a raw text frame to every connected client.
    pub fn push_raw(&self, text: impl Into<String>) {
        let _ = self.push_tx.send(text.into());
    }

    /// Push a processing status snapshot to every connected client.
    pub fn push_status(&self, items: &[ProcessingItem]) {
        let frame = serde_json::json!({ "type": "processing_status", "items": items });
        self.push_raw(frame.to_string());
    }

    /// Push a notification to every connected client.
    pub fn push_notification(&self, notification: &NotificationPayload) {
        let frame = serde_json::json!({ "type": "notification", "notification": notification });
        self.push_raw(frame.to_string());
    }

    /// Sever every open connection without a close handshake, as a crashed
    /// or restarted server would.
    pub fn drop_connections(&self) {
        let _ = self.kill_tx.send(());
    }

    /// All text frames received from clients so far, in arrival order.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Number of currently open connections.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of connections accepted over the server's lifetime.
    pub fn total_connections(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Poll until `predicate` holds or the timeout elapses. Returns whether
    /// the predicate held.
    pub async fn wait_until(
        timeout: std::time::Duration,
        mut predicate: impl FnMut() -> bool,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if predicate() {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        predicate()
    }
}
