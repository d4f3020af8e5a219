use std::sync::Arc;

use async_trait::async_trait;

use crate::events::PriceUpdate;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to deliver price update: {0}")]
    Delivery(String),
}

/// Best-effort push of freshly saved prices to subscribers.
#[async_trait]
pub trait PriceNotifier: Send + Sync {
    async fn notify(&self, updates: &[PriceUpdate]) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: PriceNotifier + ?Sized> PriceNotifier for Arc<T> {
    async fn notify(&self, updates: &[PriceUpdate]) -> Result<(), NotifyError> {
        (**self).notify(updates).await
    }
}

/// Notifier for deployments without push subscribers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl PriceNotifier for NoopNotifier {
    async fn notify(&self, _updates: &[PriceUpdate]) -> Result<(), NotifyError> {
        Ok(())
    }
}
