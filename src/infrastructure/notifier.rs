use crate::domain::ports::{Notification, Notifier};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Emits notifications as `tracing` events instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Keeps every notification in memory so callers can inspect what was sent.
#[derive(Debug, Default, Clone)]
pub struct OutboxNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        self.sent.write().await.push(notification);
        Ok(())
    }
}
