//! Transient, auto-expiring notification queue
//!
//! Every message removes itself after [`NOTIFICATION_TTL`]. Nothing here is
//! persisted and the queue is unbounded.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Success,
  Error,
  Info,
}

impl std::fmt::Display for Severity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Success => write!(f, "success"),
      Self::Error => write!(f, "error"),
      Self::Info => write!(f, "info"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
  pub id: String,
  pub message: String,
  #[serde(rename = "type")]
  pub severity: Severity,
}

#[derive(Clone)]
pub struct NotificationQueue {
  items: Arc<RwLock<Vec<Notification>>>,
  ttl: Duration,
}

impl std::fmt::Debug for NotificationQueue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NotificationQueue")
      .field("ttl", &self.ttl)
      .finish_non_exhaustive()
  }
}

impl Default for NotificationQueue {
  fn default() -> Self {
    Self::new()
  }
}

impl NotificationQueue {
  pub fn new() -> Self {
    Self::with_ttl(NOTIFICATION_TTL)
  }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      items: Arc::new(RwLock::new(Vec::new())),
      ttl,
    }
  }

  /// Enqueue a message and schedule its removal.
  ///
  /// Must be called from within a tokio runtime.
  pub async fn push(&self, message: impl Into<String>, severity: Severity) -> String {
    let notification = Notification {
      id: Uuid::new_v4().simple().to_string(),
      message: message.into(),
      severity,
    };
    let id = notification.id.clone();

    match severity {
      Severity::Error => tracing::warn!(id = %id, "{}", notification.message),
      _ => tracing::info!(id = %id, severity = %severity, "{}", notification.message),
    }

    self.items.write().await.push(notification);

    let items = Arc::clone(&self.items);
    let expire_id = id.clone();
    let ttl = self.ttl;
    tokio::spawn(async move {
      tokio::time::sleep(ttl).await;
      items.write().await.retain(|n| n.id != expire_id);
    });

    id
  }

  pub async fn success(&self, message: impl Into<String>) -> String {
    self.push(message, Severity::Success).await
  }

  pub async fn error(&self, message: impl Into<String>) -> String {
    self.push(message, Severity::Error).await
  }

  pub async fn info(&self, message: impl Into<String>) -> String {
    self.push(message, Severity::Info).await
  }

  /// Snapshot of live notifications in insertion order
  pub async fn active(&self) -> Vec<Notification> {
    self.items.read().await.clone()
  }

  /// Remove and return everything currently queued
  pub async fn drain(&self) -> Vec<Notification> {
    std::mem::take(&mut *self.items.write().await)
  }

  pub async fn clear(&self) {
    self.items.write().await.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_notification_expires_after_ttl() {
    let queue = NotificationQueue::new();
    queue.success("Workout saved successfully!").await;
    assert_eq!(queue.active().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(3900)).await;
    assert_eq!(queue.active().await.len(), 1, "still visible before 4s");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(queue.active().await.is_empty(), "gone after 4s");
  }

  #[tokio::test(start_paused = true)]
  async fn test_each_notification_expires_independently() {
    let queue = NotificationQueue::new();
    let first = queue.info("first").await;
    tokio::time::sleep(Duration::from_millis(2000)).await;
    let second = queue.error("second").await;

    tokio::time::sleep(Duration::from_millis(2100)).await;
    let live = queue.active().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, second);
    assert_ne!(live[0].id, first);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(queue.active().await.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_insertion_order_and_severity() {
    let queue = NotificationQueue::new();
    queue.success("a").await;
    queue.error("b").await;
    queue.info("c").await;

    let live = queue.active().await;
    let messages: Vec<_> = live.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
    assert_eq!(live[1].severity, Severity::Error);
  }

  #[tokio::test(start_paused = true)]
  async fn test_clear_before_expiry() {
    let queue = NotificationQueue::new();
    queue.info("one").await;
    queue.info("two").await;
    queue.clear().await;
    assert!(queue.active().await.is_empty());

    // Pending timers fire against an empty queue without effect
    queue.info("three").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(queue.active().await.len(), 1);
  }

  #[tokio::test]
  async fn test_drain_empties_queue() {
    let queue = NotificationQueue::new();
    queue.success("saved").await;
    let drained = queue.drain().await;
    assert_eq!(drained.len(), 1);
    assert!(queue.active().await.is_empty());
  }
}
