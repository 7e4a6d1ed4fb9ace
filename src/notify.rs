//! Transient user-facing messages
//!
//! Action outcomes (alias saves, login, logout) are announced as short
//! messages. The shell subscribes to the broadcast channel to print them as
//! they arrive; the latest one is also kept for the rendered view.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct Notifier {
    latest: Arc<RwLock<Option<String>>>,
    sender: broadcast::Sender<String>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            latest: Arc::new(RwLock::new(None)),
            sender,
        }
    }

    /// Publish a message
    pub async fn show(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(message = %message, "Notification");

        *self.latest.write().await = Some(message.clone());
        // No subscribers is fine; the latest message is still kept
        let _ = self.sender.send(message);
    }

    pub async fn latest(&self) -> Option<String> {
        self.latest.read().await.clone()
    }

    pub async fn dismiss(&self) {
        *self.latest.write().await = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_show_keeps_latest_and_broadcasts() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.show("Alias saved").await;
        notifier.show("Logged out").await;

        assert_eq!(notifier.latest().await.as_deref(), Some("Logged out"));
        assert_eq!(rx.recv().await.unwrap(), "Alias saved");
        assert_eq!(rx.recv().await.unwrap(), "Logged out");

        notifier.dismiss().await;
        assert_eq!(notifier.latest().await, None);
    }

    #[tokio::test]
    async fn test_show_without_subscribers() {
        let notifier = Notifier::new();
        notifier.show("Login failed").await;
        assert_eq!(notifier.latest().await.as_deref(), Some("Login failed"));
    }
}
