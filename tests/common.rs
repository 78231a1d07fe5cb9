use push_relay::config::BackendType;
use push_relay::domain::{PushNotification, PushType};
use push_relay::services::PushMetrics;
use std::io::Write;
use std::sync::Mutex;

pub fn setup_tracing() {
    push_relay::telemetry::init_test_telemetry();
}

#[derive(Debug, Default)]
pub struct RecordingMetrics {
    pub totals: Mutex<Vec<(BackendType, String)>>,
    pub latencies: Mutex<Vec<f64>>,
    pub successes: Mutex<u32>,
    pub successes_with_ack: Mutex<u32>,
    pub failures: Mutex<Vec<(BackendType, String, String)>>,
}

#[allow(dead_code)]
impl RecordingMetrics {
    pub fn total_count(&self) -> usize {
        self.totals.lock().unwrap().len()
    }

    pub fn latency_count(&self) -> usize {
        self.latencies.lock().unwrap().len()
    }

    pub fn success_count(&self) -> u32 {
        *self.successes.lock().unwrap()
    }

    pub fn success_with_ack_count(&self) -> u32 {
        *self.successes_with_ack.lock().unwrap()
    }

    pub fn failure_reasons(&self) -> Vec<String> {
        self.failures.lock().unwrap().iter().map(|(_, _, reason)| reason.clone()).collect()
    }
}

impl PushMetrics for RecordingMetrics {
    fn increment_notification_total(&self, backend: BackendType, push_type: &PushType) {
        self.totals.lock().unwrap().push((backend, push_type.to_string()));
    }

    fn observe_response(&self, _backend: BackendType, seconds: f64) {
        self.latencies.lock().unwrap().push(seconds);
    }

    fn increment_success(&self, _backend: BackendType, _push_type: &PushType) {
        *self.successes.lock().unwrap() += 1;
    }

    fn increment_success_with_ack(&self, _backend: BackendType, _push_type: &PushType) {
        *self.successes_with_ack.lock().unwrap() += 1;
    }

    fn increment_failure(&self, backend: BackendType, push_type: &PushType, reason: &str) {
        self.failures.lock().unwrap().push((backend, push_type.to_string(), reason.to_string()));
    }
}

#[allow(dead_code)]
pub fn chat_message(device_id: &str) -> PushNotification {
    let mut msg = PushNotification::new(PushType::Message, device_id);
    msg.server_id = "server-1".to_string();
    msg.ack_id = "abc".to_string();
    msg.channel_id = "channel-1".to_string();
    msg.channel_name = "town-square".to_string();
    msg.team_id = "team-1".to_string();
    msg.sender_id = "user-1".to_string();
    msg.sender_name = "alice".to_string();
    msg.post_id = "post-1".to_string();
    msg.message = "hi :smile:".to_string();
    msg.badge = 1;
    msg.version = "v2".to_string();
    msg
}

/// Base URL of a port nothing listens on.
#[allow(dead_code)]
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[allow(dead_code)]
pub fn device_map(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
