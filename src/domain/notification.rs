use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event a push notification announces.
///
/// Unknown kinds are kept verbatim so they can be echoed back to the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PushType {
    Message,
    Session,
    Clear,
    UpdateBadge,
    Other(String),
}

impl PushType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Session => "session",
            Self::Clear => "clear",
            Self::UpdateBadge => "update_badge",
            Self::Other(kind) => kind,
        }
    }

    /// Whether devices expect the full message body for this kind.
    #[must_use]
    pub const fn carries_content(&self) -> bool {
        matches!(self, Self::Message | Self::Session)
    }
}

impl From<String> for PushType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "message" => Self::Message,
            "session" => Self::Session,
            "clear" => Self::Clear,
            "update_badge" => Self::UpdateBadge,
            _ => Self::Other(value),
        }
    }
}

impl From<PushType> for String {
    fn from(value: PushType) -> Self {
        match value {
            PushType::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PushType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized notification handed to a backend for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub ack_id: String,
    #[serde(rename = "type")]
    pub push_type: PushType,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub badge: i32,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub is_id_loaded: bool,
    #[serde(default)]
    pub override_username: String,
    #[serde(default)]
    pub override_icon_url: String,
    #[serde(default)]
    pub from_webhook: String,
}

impl PushNotification {
    #[must_use]
    pub fn new(push_type: PushType, device_id: impl Into<String>) -> Self {
        Self {
            server_id: String::new(),
            device_id: device_id.into(),
            ack_id: String::new(),
            push_type,
            message: String::new(),
            sender_id: String::new(),
            sender_name: String::new(),
            channel_id: String::new(),
            channel_name: String::new(),
            team_id: String::new(),
            post_id: String::new(),
            root_id: String::new(),
            badge: 0,
            version: String::new(),
            is_id_loaded: false,
            override_username: String::new(),
            override_icon_url: String::new(),
            from_webhook: String::new(),
        }
    }

    #[must_use]
    pub fn wants_ack(&self) -> bool {
        !self.ack_id.is_empty()
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PushResponse {
    #[serde(rename = "OK")]
    Success {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        acknowledged: bool,
    },
    #[serde(rename = "FAIL")]
    Failure {
        #[serde(rename = "error")]
        reason: String,
    },
}

impl PushResponse {
    #[must_use]
    pub const fn ok(acknowledged: bool) -> Self {
        Self::Success { acknowledged }
    }

    #[must_use]
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure { reason: reason.into() }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}
