use crate::adapters::push::PushBackend;
use crate::config::BackendType;
use crate::domain::{PushNotification, PushResponse};
use crate::error::PushError;
use crate::services::metrics::PushMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Delivers notifications through one push backend.
#[async_trait]
pub trait NotificationServer: Send + Sync + std::fmt::Debug {
    fn backend_type(&self) -> BackendType;

    /// Checks that the backend has usable credentials.
    ///
    /// Returns false (after logging why) instead of failing, so callers can skip the backend.
    fn initialize(&self) -> bool;

    /// Makes a single delivery attempt. Never panics and never returns an error:
    /// every failure is folded into [`PushResponse::Failure`].
    async fn send_notification(&self, msg: &PushNotification) -> PushResponse;
}

/// Shared adapter core: wraps a [`PushBackend`] with logging, metrics and response shaping.
#[derive(Debug)]
pub struct PushNotificationServer<B> {
    backend: B,
    metrics: Arc<dyn PushMetrics>,
}

impl<B: PushBackend> PushNotificationServer<B> {
    #[must_use]
    pub fn new(backend: B, metrics: Arc<dyn PushMetrics>) -> Self {
        Self { backend, metrics }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    async fn deliver(&self, msg: &PushNotification) -> Result<(), PushError> {
        self.backend.check_credentials().map_err(|_| PushError::NotConfigured)?;

        let request = self.backend.build_request(msg).await?;

        tracing::info!(backend = %self.backend.backend_type(), "Sending android push notification");
        let start = Instant::now();
        let result = self.backend.transmit(request).await;
        self.metrics.observe_response(self.backend.backend_type(), start.elapsed().as_secs_f64());

        let body = result?;
        self.backend.classify_response(&body).await?;

        tracing::debug!(response = %body, "Push accepted by backend");
        Ok(())
    }
}

#[async_trait]
impl<B: PushBackend> NotificationServer for PushNotificationServer<B> {
    fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    fn initialize(&self) -> bool {
        let backend = self.backend.backend_type();
        tracing::info!(%backend, "Initializing Android notification server");

        match self.backend.check_credentials() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(%backend, error = %e, "Android push notifications not configured");
                false
            }
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(server_id = %msg.server_id, device_id = %msg.device_id, push_type = %msg.push_type)
    )]
    async fn send_notification(&self, msg: &PushNotification) -> PushResponse {
        let backend = self.backend.backend_type();
        self.metrics.increment_notification_total(backend, &msg.push_type);

        match self.deliver(msg).await {
            Ok(()) => {
                let acknowledged = msg.wants_ack();
                if acknowledged {
                    self.metrics.increment_success_with_ack(backend, &msg.push_type);
                } else {
                    self.metrics.increment_success(backend, &msg.push_type);
                }
                tracing::info!(%backend, acknowledged, "Sent android push notification");
                PushResponse::ok(acknowledged)
            }
            Err(e) => {
                let reason = e.reason().to_string();
                tracing::error!(%backend, error = %e, reason = %reason, "Failed to send android push notification");
                self.metrics.increment_failure(backend, &msg.push_type, &reason);
                PushResponse::failure(reason)
            }
        }
    }
}
