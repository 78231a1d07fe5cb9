use crate::config::BackendType;
use crate::domain::PushType;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

/// Platform tag attached to every push metric.
pub const PLATFORM_ANDROID: &str = "android";

/// Sink for per-send instrumentation.
pub trait PushMetrics: Send + Sync + std::fmt::Debug {
    fn increment_notification_total(&self, backend: BackendType, push_type: &PushType);
    fn observe_response(&self, backend: BackendType, seconds: f64);
    fn increment_success(&self, backend: BackendType, push_type: &PushType);
    fn increment_success_with_ack(&self, backend: BackendType, push_type: &PushType);
    fn increment_failure(&self, backend: BackendType, push_type: &PushType, reason: &str);
}

/// OpenTelemetry instruments registered on the global meter provider.
#[derive(Clone, Debug)]
pub struct OtelPushMetrics {
    total: Counter<u64>,
    success: Counter<u64>,
    success_with_ack: Counter<u64>,
    failure: Counter<u64>,
    response_seconds: Histogram<f64>,
}

impl OtelPushMetrics {
    #[must_use]
    pub fn new() -> Self {
        let meter = global::meter("push-relay");
        Self {
            total: meter
                .u64_counter("notification_total")
                .with_description("Total number of push notifications attempted")
                .build(),
            success: meter
                .u64_counter("notification_success")
                .with_description("Push notifications accepted by the backend")
                .build(),
            success_with_ack: meter
                .u64_counter("notification_success_with_ack")
                .with_description("Push notifications accepted by the backend that expect an acknowledgment")
                .build(),
            failure: meter
                .u64_counter("notification_failure")
                .with_description("Push notifications that could not be delivered, by reason")
                .build(),
            response_seconds: meter
                .f64_histogram("notification_response_seconds")
                .with_description("Time spent waiting for the push backend")
                .with_unit("s")
                .build(),
        }
    }

    fn attributes(backend: BackendType, push_type: &PushType) -> [KeyValue; 3] {
        [
            KeyValue::new("platform", PLATFORM_ANDROID),
            KeyValue::new("backend", backend.as_str()),
            KeyValue::new("type", push_type.to_string()),
        ]
    }
}

impl Default for OtelPushMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PushMetrics for OtelPushMetrics {
    fn increment_notification_total(&self, backend: BackendType, push_type: &PushType) {
        self.total.add(1, &Self::attributes(backend, push_type));
    }

    fn observe_response(&self, backend: BackendType, seconds: f64) {
        self.response_seconds.record(
            seconds,
            &[KeyValue::new("platform", PLATFORM_ANDROID), KeyValue::new("backend", backend.as_str())],
        );
    }

    fn increment_success(&self, backend: BackendType, push_type: &PushType) {
        self.success.add(1, &Self::attributes(backend, push_type));
    }

    fn increment_success_with_ack(&self, backend: BackendType, push_type: &PushType) {
        self.success_with_ack.add(1, &Self::attributes(backend, push_type));
    }

    fn increment_failure(&self, backend: BackendType, push_type: &PushType, reason: &str) {
        let [platform, backend, kind] = Self::attributes(backend, push_type);
        self.failure.add(1, &[platform, backend, kind, KeyValue::new("reason", reason.to_string())]);
    }
}
