pub mod reconcile;

use crate::models::{Notification, NotificationPayload, ProcessingItem};
use crate::notify::NotificationCenter;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::TransportHandle;
use reconcile::reconcile;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How long a fully completed item stays visible before removal
    pub removal_grace: Duration,
    /// Cooldown window for the notification dedup cache
    pub notification_cooldown: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            removal_grace: Duration::from_secs(10),
            notification_cooldown: Duration::from_secs(5),
        }
    }
}

/// Commands sent to the sync service
pub enum SyncCommand {
    /// User-initiated removal: drop locally and tell the server
    DeleteItem { item_id: String },
    DismissNotification { timestamp: i64 },
    ClearNotifications,
}

/// Handle to the sync service. Consumers read immutable snapshots from the
/// watch channels and mutate only through commands.
#[derive(Clone)]
pub struct SyncHandle {
    command_tx: mpsc::UnboundedSender<SyncCommand>,
    items_rx: watch::Receiver<Vec<Arc<ProcessingItem>>>,
    notifications_rx: watch::Receiver<Vec<Notification>>,
}

impl SyncHandle {
    /// Current item snapshot.
    pub fn items(&self) -> Vec<Arc<ProcessingItem>> {
        self.items_rx.borrow().clone()
    }

    /// Watch item snapshots as they are published.
    pub fn items_stream(&self) -> watch::Receiver<Vec<Arc<ProcessingItem>>> {
        self.items_rx.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications_rx.borrow().clone()
    }

    pub fn notifications_stream(&self) -> watch::Receiver<Vec<Notification>> {
        self.notifications_rx.clone()
    }

    /// Remove an item now and ask the server to drop it too. Idempotent when
    /// the item is already gone.
    pub fn delete_item(&self, item_id: impl Into<String>) {
        let _ = self.command_tx.send(SyncCommand::DeleteItem {
            item_id: item_id.into(),
        });
    }

    pub fn dismiss_notification(&self, timestamp: i64) {
        let _ = self
            .command_tx
            .send(SyncCommand::DismissNotification { timestamp });
    }

    pub fn clear_notifications(&self) {
        let _ = self.command_tx.send(SyncCommand::ClearNotifications);
    }
}

/// Start the sync service, consuming the transport's inbound stream.
pub fn start_sync(
    options: SyncOptions,
    transport: TransportHandle,
    inbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
) -> SyncHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (items_tx, items_rx) = watch::channel(Vec::new());
    let (notifications_tx, notifications_rx) = watch::channel(Vec::new());

    let service = SyncService {
        transport,
        inbound_rx,
        command_rx,
        items: Vec::new(),
        scheduler: RemovalScheduler::new(options.removal_grace),
        notifications: NotificationCenter::new(options.notification_cooldown),
        items_tx,
        notifications_tx,
    };
    tokio::spawn(service.run());

    SyncHandle {
        command_tx,
        items_rx,
        notifications_rx,
    }
}

/// Tracks the per-item grace timers for completed items. A deadline exists
/// exactly while its item qualifies; any change to the watched fields makes
/// the item stop qualifying, which cancels the pending removal.
pub struct RemovalScheduler {
    grace: Duration,
    deadlines: HashMap<String, Instant>,
}

impl RemovalScheduler {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            deadlines: HashMap::new(),
        }
    }

    /// All milestones reached and progress at 100: the job is done and only
    /// stays visible for the grace period.
    pub fn qualifies(item: &ProcessingItem) -> bool {
        item.status.imported
            && item.status.cached
            && item.status.added
            && item.status.mounted
            && item.status.symlinked
            && item.status.progress == 100
    }

    /// Re-derive deadlines from the current collection.
    pub fn sync(&mut self, items: &[Arc<ProcessingItem>], now: Instant) {
        // Drop timers for items that are gone or no longer qualify.
        self.deadlines.retain(|id, _| {
            items
                .iter()
                .any(|item| item.id == *id && Self::qualifies(item))
        });

        for item in items {
            if Self::qualifies(item) && !self.deadlines.contains_key(&item.id) {
                debug!("Scheduling delayed removal for completed item {}", item.id);
                self.deadlines.insert(item.id.clone(), now + self.grace);
            }
        }
    }

    pub fn cancel(&mut self, item_id: &str) {
        self.deadlines.remove(item_id);
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<(String, Instant)> {
        self.deadlines
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(id, at)| (id.clone(), *at))
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

struct SyncService {
    transport: TransportHandle,
    inbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
    command_rx: mpsc::UnboundedReceiver<SyncCommand>,
    items: Vec<Arc<ProcessingItem>>,
    scheduler: RemovalScheduler,
    notifications: NotificationCenter,
    items_tx: watch::Sender<Vec<Arc<ProcessingItem>>>,
    notifications_tx: watch::Sender<Vec<Notification>>,
}

impl SyncService {
    async fn run(mut self) {
        info!("Sync service started");

        loop {
            let next_due = self.scheduler.next_due();
            let removal_at = next_due
                .as_ref()
                .map(|(_, at)| *at)
                .unwrap_or_else(Instant::now);

            tokio::select! {
                message = self.inbound_rx.recv() => {
                    match message {
                        Some(ServerMessage::ProcessingStatus { items }) => {
                            self.handle_snapshot(items);
                        }
                        Some(ServerMessage::Notification { notification }) => {
                            self.handle_notification(notification);
                        }
                        Some(ServerMessage::Unknown) => {}
                        None => {
                            // Transport shut down; nothing more will arrive.
                            break;
                        }
                    }
                }
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => break,
                    }
                }
                _ = tokio::time::sleep_until(removal_at), if next_due.is_some() => {
                    if let Some((item_id, _)) = next_due {
                        self.remove_item(&item_id, false);
                    }
                }
            }
        }

        info!("Sync service stopped");
    }

    fn handle_snapshot(&mut self, incoming: Vec<ProcessingItem>) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.items = reconcile(&self.items, incoming, now_ms);
        self.scheduler.sync(&self.items, Instant::now());
        self.publish_items();
    }

    fn handle_notification(&mut self, payload: NotificationPayload) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        if let Some(notification) = self.notifications.push(payload, now_ms) {
            info!(
                "Notification surfaced: [{}] {}",
                notification.kind.as_str(),
                notification.title
            );
            self.publish_notifications();
        }
    }

    fn handle_command(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::DeleteItem { item_id } => self.remove_item(&item_id, true),
            SyncCommand::DismissNotification { timestamp } => {
                self.notifications.dismiss(timestamp);
                self.publish_notifications();
            }
            SyncCommand::ClearNotifications => {
                self.notifications.clear();
                self.publish_notifications();
            }
        }
    }

    /// Remove an item from the collection. For explicit deletes the server
    /// is told as well; for grace-period expiry it already knows.
    fn remove_item(&mut self, item_id: &str, notify_server: bool) {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.scheduler.cancel(item_id);

        if notify_server {
            self.transport.send(ClientMessage::DeleteItem {
                item_id: item_id.to_string(),
            });
        }

        if self.items.len() != before {
            debug!("Removed item {}", item_id);
            self.publish_items();
        }
    }

    fn publish_items(&self) {
        let _ = self.items_tx.send(self.items.clone());
    }

    fn publish_notifications(&self) {
        let _ = self.notifications_tx.send(self.notifications.notifications().to_vec());
    }
}
