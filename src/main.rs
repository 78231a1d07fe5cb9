#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use anyhow::Context;
use push_relay::config::Config;
use push_relay::services::{OtelPushMetrics, PushMetrics};
use push_relay::{NotificationServerRegistry, PushNotification, telemetry};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::Instrument;

async fn read_notification(config: &Config) -> anyhow::Result<PushNotification> {
    let raw = match &config.notification {
        Some(path) => tokio::fs::read(path).await.with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await.context("reading notification from stdin")?;
            buf
        }
    };
    serde_json::from_slice(&raw).context("parsing notification")
}

async fn dispatch(config: &Config) -> anyhow::Result<()> {
    let metrics: Arc<dyn PushMetrics> = Arc::new(OtelPushMetrics::new());
    let registry = NotificationServerRegistry::from_config(&config.push, &metrics)?;

    let backend = config.push.backend;
    let server = registry.get(backend).with_context(|| format!("{backend} backend is not configured"))?;

    let msg = read_notification(config).await?;
    let response = server.send_notification(&msg).await;
    tracing::info!(response = %serde_json::to_string(&response)?, "Dispatch finished");

    match response.reason() {
        None => Ok(()),
        Some(reason) => Err(anyhow::anyhow!("push failed: {reason}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let result = dispatch(&config).instrument(tracing::info_span!("dispatch")).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Dispatch failed");
    }

    telemetry_guard.shutdown();
    result
}
