use crate::adapters::push::{ApiCredentials, PushBackend};
use crate::config::BackendType;
use crate::domain::{PushData, PushNotification};
use crate::error::{CredentialsError, PushError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Alert shown in the system tray; the real text travels in the Android notice.
pub const GENERIC_ALERT: &str = "New Message";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JPushPayload {
    pub platform: Vec<&'static str>,
    pub audience: Audience,
    pub notification: Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Audience {
    pub registration_id: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub alert: &'static str,
    pub android: AndroidNotice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidNotice {
    pub alert: String,
    pub title: String,
    pub extras: Extras,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extras {
    pub data: PushData,
}

impl JPushPayload {
    #[must_use]
    pub fn for_notification(msg: &PushNotification) -> Self {
        let data = PushData::from_notification(msg);
        let alert = data.message().unwrap_or(GENERIC_ALERT).to_string();
        let title = data.sender_name().unwrap_or_default().to_string();

        Self {
            platform: vec!["android"],
            audience: Audience { registration_id: vec![msg.device_id.clone()] },
            notification: Notice { alert: GENERIC_ALERT, android: AndroidNotice { alert, title, extras: Extras { data } } },
        }
    }
}

#[derive(Debug, Deserialize)]
struct JPushErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JPushReply {
    Rejected {
        error: JPushErrorBody,
    },
    #[allow(dead_code)]
    Accepted {
        msg_id: serde_json::Value,
    },
}

#[derive(Debug)]
pub struct JPushBackend {
    http: reqwest::Client,
    push_url: String,
    api_key: String,
}

impl JPushBackend {
    #[must_use]
    pub fn new(http: reqwest::Client, api_base: &str, api_key: impl Into<String>) -> Self {
        Self { http, push_url: format!("{}/v3/push", api_base.trim_end_matches('/')), api_key: api_key.into() }
    }
}

#[async_trait]
impl PushBackend for JPushBackend {
    type Request = JPushPayload;

    fn backend_type(&self) -> BackendType {
        BackendType::Jpush
    }

    fn check_credentials(&self) -> Result<(), CredentialsError> {
        self.api_key.parse::<ApiCredentials>().map(|_| ())
    }

    async fn build_request(&self, msg: &PushNotification) -> Result<Self::Request, PushError> {
        Ok(JPushPayload::for_notification(msg))
    }

    async fn transmit(&self, request: Self::Request) -> Result<String, PushError> {
        let credentials: ApiCredentials = self.api_key.parse().map_err(|_| PushError::NotConfigured)?;

        let response = self
            .http
            .post(&self.push_url)
            .basic_auth(&credentials.id, Some(&credentials.secret))
            .json(&request)
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "JPush responded");
        response.text().await.map_err(|e| PushError::InvalidResponse(e.to_string()))
    }

    async fn classify_response(&self, body: &str) -> Result<(), PushError> {
        match serde_json::from_str::<JPushReply>(body) {
            Ok(JPushReply::Accepted { .. }) => Ok(()),
            Ok(JPushReply::Rejected { error }) => Err(PushError::rejected(error.code, error.message)),
            Err(e) => Err(PushError::InvalidResponse(e.to_string())),
        }
    }
}
