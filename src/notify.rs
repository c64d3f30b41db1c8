use crate::models::{Notification, NotificationPayload};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Suppresses repeats of the same `(type, title, message)` alert inside a
/// cooldown window. Explicitly owned by the sync service; entries older than
/// the window are swept on every admit, so the map stays bounded by the
/// distinct alerts of the last window.
pub struct DedupCache {
    cooldown: Duration,
    last_seen: HashMap<String, i64>,
}

impl DedupCache {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_seen: HashMap::new(),
        }
    }

    /// Returns true when the payload should surface. `now_ms` is epoch
    /// milliseconds, injected so callers can test the window.
    pub fn admit(&mut self, payload: &NotificationPayload, now_ms: i64) -> bool {
        let key = format!(
            "{}-{}-{}",
            payload.kind.as_str(),
            payload.title,
            payload.message
        );
        let cooldown_ms = self.cooldown.as_millis() as i64;

        let surfaced = match self.last_seen.get(&key) {
            Some(seen) => now_ms - seen > cooldown_ms,
            None => true,
        };

        if surfaced {
            self.last_seen.insert(key, now_ms);
            self.last_seen.retain(|_, seen| now_ms - *seen <= cooldown_ms);
        } else {
            debug!("Suppressing repeated notification '{}'", payload.title);
        }

        surfaced
    }
}

/// Bounded in-memory notification list. Oldest entries fall off when the cap
/// is exceeded; nothing persists across restarts.
pub struct NotificationCenter {
    dedup: DedupCache,
    notifications: Vec<Notification>,
    capacity: usize,
}

pub const DEFAULT_CAPACITY: usize = 100;

impl NotificationCenter {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_capacity(cooldown, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(cooldown: Duration, capacity: usize) -> Self {
        Self {
            dedup: DedupCache::new(cooldown),
            notifications: Vec::new(),
            capacity,
        }
    }

    /// Admit a payload through the dedup cache. Returns the surfaced
    /// notification, stamped with `now_ms`, or None when suppressed.
    pub fn push(&mut self, payload: NotificationPayload, now_ms: i64) -> Option<Notification> {
        if !self.dedup.admit(&payload, now_ms) {
            return None;
        }

        let notification = Notification {
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            timestamp: now_ms,
        };
        self.notifications.push(notification.clone());

        if self.notifications.len() > self.capacity {
            let excess = self.notifications.len() - self.capacity;
            self.notifications.drain(..excess);
        }

        Some(notification)
    }

    /// Dismiss by receipt timestamp. No-op when already gone.
    pub fn dismiss(&mut self, timestamp: i64) {
        self.notifications.retain(|n| n.timestamp != timestamp);
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}
