use crate::adapters::push::device_map::DeviceMap;
use crate::adapters::push::{self, JPushBackend, WechatBackend};
use crate::config::{BackendType, PushConfig};
use crate::services::metrics::PushMetrics;
use crate::services::notification_server::{NotificationServer, PushNotificationServer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Initialized notification servers keyed by backend.
#[derive(Debug, Default)]
pub struct NotificationServerRegistry {
    servers: HashMap<BackendType, Arc<dyn NotificationServer>>,
}

impl NotificationServerRegistry {
    /// Builds every backend from `config` and keeps the ones that initialize.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &PushConfig, metrics: &Arc<dyn PushMetrics>) -> reqwest::Result<Self> {
        let http = push::http_client(Duration::from_secs(config.request_timeout_secs))?;

        let jpush = JPushBackend::new(http.clone(), &config.jpush_api_url, config.api_key(BackendType::Jpush));
        let wechat = WechatBackend::new(
            http,
            &config.wechat_api_url,
            config.api_key(BackendType::Wechat),
            config.wechat_template_id.as_str(),
            DeviceMap::new(&config.wechat_device_map),
        );

        let mut registry = Self::default();
        registry.register(Arc::new(PushNotificationServer::new(jpush, Arc::clone(metrics))));
        registry.register(Arc::new(PushNotificationServer::new(wechat, Arc::clone(metrics))));
        Ok(registry)
    }

    /// Adds `server` if it initializes. Returns whether it was registered.
    pub fn register(&mut self, server: Arc<dyn NotificationServer>) -> bool {
        let backend = server.backend_type();
        if !server.initialize() {
            tracing::warn!(%backend, "Skipping notification server that failed to initialize");
            return false;
        }
        tracing::info!(%backend, "Registered notification server");
        self.servers.insert(backend, server);
        true
    }

    #[must_use]
    pub fn get(&self, backend: BackendType) -> Option<Arc<dyn NotificationServer>> {
        self.servers.get(&backend).map(Arc::clone)
    }

    #[must_use]
    pub fn backends(&self) -> Vec<BackendType> {
        let mut backends: Vec<_> = self.servers.keys().copied().collect();
        backends.sort_by_key(|b| b.as_str());
        backends
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
