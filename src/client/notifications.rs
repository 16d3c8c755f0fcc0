use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Notification, NotificationType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Pushed(String),
    Removed(String),
    Expired(String),
    Cleared,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Notification>,
    timers: HashMap<String, AbortHandle>,
}

/// Transient user-facing messages in arrival order.
///
/// Each entry with a duration owns one expiration task. Removing the entry
/// aborts the task, and a task only removes its entry while it still holds
/// its slot in `timers`, so an expiration fires at most once and never
/// after a manual removal.
///
/// Pushing an expiring entry spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<QueueEvent>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: QueueEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Appends an entry that expires after `duration`, or after the
    /// type's default duration when `None`. Returns the new id.
    pub fn push(
        &self,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> String {
        let duration = duration.unwrap_or_else(|| notification_type.default_duration());
        self.insert(notification_type, title.into(), message.into(), Some(duration))
    }

    /// Appends an entry that stays until removed.
    pub fn push_sticky(
        &self,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> String {
        self.insert(notification_type, title.into(), message.into(), None)
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> String {
        self.push(NotificationType::Success, title, message, None)
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> String {
        self.push(NotificationType::Error, title, message, None)
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> String {
        self.push(NotificationType::Warning, title, message, None)
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> String {
        self.push(NotificationType::Info, title, message, None)
    }

    fn insert(
        &self,
        notification_type: NotificationType,
        title: String,
        message: String,
        duration: Option<Duration>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let notification = Notification {
            id: id.clone(),
            notification_type,
            title,
            message,
            duration: duration.map(|d| d.as_millis() as u64),
            created_at: Utc::now(),
        };

        let mut inner = self.lock();
        inner.entries.push(notification);
        if let Some(duration) = duration {
            let handle = tokio::spawn(self.clone().expire_after(id.clone(), duration));
            inner.timers.insert(id.clone(), handle.abort_handle());
        }
        drop(inner);

        debug!("Notification {} ({}) queued", id, notification_type.as_str());
        self.emit(QueueEvent::Pushed(id.clone()));
        id
    }

    async fn expire_after(self, id: String, duration: Duration) {
        tokio::time::sleep(duration).await;

        let mut inner = self.lock();
        if inner.timers.remove(&id).is_none() {
            return;
        }
        inner.entries.retain(|n| n.id != id);
        drop(inner);

        debug!("Notification {} expired", id);
        self.emit(QueueEvent::Expired(id));
    }

    /// Removes an entry and cancels its expiration. Absent ids are a no-op.
    pub fn remove(&self, id: &str) {
        let mut inner = self.lock();
        if let Some(timer) = inner.timers.remove(id) {
            timer.abort();
        }
        let before = inner.entries.len();
        inner.entries.retain(|n| n.id != id);
        let removed = inner.entries.len() != before;
        drop(inner);

        if removed {
            self.emit(QueueEvent::Removed(id.to_string()));
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        inner.entries.clear();
        drop(inner);

        self.emit(QueueEvent::Cleared);
    }

    pub fn list(&self) -> Vec<Notification> {
        self.lock().entries.clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.lock().entries.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_durations_by_type() {
        let queue = NotificationQueue::new();
        queue.success("a", "a");
        queue.error("b", "b");
        queue.warning("c", "c");
        queue.info("d", "d");

        let durations: Vec<Option<u64>> = queue.list().iter().map(|n| n.duration).collect();
        assert_eq!(durations, vec![Some(5000), Some(7000), Some(6000), Some(4000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_independently() {
        let queue = NotificationQueue::new();
        let info = queue.info("Heads up", "short lived");
        let error = queue.error("Oops", "long lived");

        tokio::time::sleep(Duration::from_millis(4001)).await;
        settle().await;
        let ids: Vec<String> = queue.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![error.clone()]);
        assert_ne!(info, error);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        settle().await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_duration_overrides_default() {
        let queue = NotificationQueue::new();
        queue.push(NotificationType::Success, "Saved", "quick", Some(Duration::from_millis(100)));

        tokio::time::sleep(Duration::from_millis(101)).await;
        settle().await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_before_expiry_cancels_timer() {
        let queue = NotificationQueue::new();
        let mut events = queue.subscribe();

        let id = queue.success("Enrollment Successful", "done");
        queue.remove(&id);
        assert!(queue.is_empty());

        tokio::time::sleep(Duration::from_millis(6000)).await;
        settle().await;

        assert_eq!(events.try_recv().unwrap(), QueueEvent::Pushed(id.clone()));
        assert_eq!(events.try_recv().unwrap(), QueueEvent::Removed(id.clone()));
        assert!(events.try_recv().is_err());

        // removing again is a no-op
        queue.remove(&id);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_fires_once() {
        let queue = NotificationQueue::new();
        let mut events = queue.subscribe();
        let id = queue.info("Tip", "expires");

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        settle().await;

        assert_eq!(events.try_recv().unwrap(), QueueEvent::Pushed(id.clone()));
        assert_eq!(events.try_recv().unwrap(), QueueEvent::Expired(id.clone()));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sticky_entries_never_expire() {
        let queue = NotificationQueue::new();
        let id = queue.push_sticky(NotificationType::Warning, "Offline", "no timer");

        tokio::time::sleep(Duration::from_secs(3600)).await;
        settle().await;
        assert_eq!(queue.latest().map(|n| n.id), Some(id.clone()));
        assert_eq!(queue.latest().and_then(|n| n.duration), None);

        queue.remove(&id);
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_everything_and_keeps_order_before() {
        let queue = NotificationQueue::new();
        let first = queue.success("1", "one");
        let second = queue.info("2", "two");
        assert_eq!(queue.list()[0].id, first);
        assert_eq!(queue.latest().map(|n| n.id), Some(second));

        let mut events = queue.subscribe();
        queue.clear();
        tokio::time::sleep(Duration::from_millis(8000)).await;
        settle().await;

        assert!(queue.is_empty());
        assert_eq!(events.try_recv().unwrap(), QueueEvent::Cleared);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_notification_serializes_type_field() {
        let notification = Notification {
            id: "n1".to_string(),
            notification_type: NotificationType::Warning,
            title: "t".to_string(),
            message: "m".to_string(),
            duration: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "warning");
        assert!(value.get("duration").is_none());
        assert!(value.get("createdAt").is_some());
    }
}
