use crate::config::BackendType;
use crate::domain::PushNotification;
use crate::error::{CredentialsError, PushError};
use async_trait::async_trait;
use std::str::FromStr;

pub mod device_map;
pub mod jpush;
pub mod token_cache;
pub mod wechat;

pub use jpush::JPushBackend;
pub use wechat::WechatBackend;

/// Per-backend delivery strategy driven by [`crate::services::PushNotificationServer`].
#[async_trait]
pub trait PushBackend: Send + Sync + std::fmt::Debug {
    /// Fully built request, ready to go on the wire.
    type Request: Send;

    fn backend_type(&self) -> BackendType;

    /// Whether credentials are present and well formed.
    ///
    /// # Errors
    /// Returns the reason the configured API key cannot be used.
    fn check_credentials(&self) -> Result<(), CredentialsError>;

    /// Resolves the recipient, acquires any credentials and shapes the payload.
    ///
    /// # Errors
    /// Returns an error if the notification cannot be addressed or authorized.
    async fn build_request(&self, msg: &PushNotification) -> Result<Self::Request, PushError>;

    /// Sends the request and returns the raw response body.
    ///
    /// # Errors
    /// Returns `PushError::Transport` on connection failures and
    /// `PushError::InvalidResponse` if the body cannot be read.
    async fn transmit(&self, request: Self::Request) -> Result<String, PushError>;

    /// Interprets a response body.
    ///
    /// # Errors
    /// Returns `PushError::InvalidResponse` for unexpected shapes and
    /// `PushError::Rejected` when the backend declined the push.
    async fn classify_response(&self, body: &str) -> Result<(), PushError>;
}

/// A composite `<id>:<secret>` API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials").field("id", &self.id).field("secret", &"***").finish()
    }
}

impl FromStr for ApiCredentials {
    type Err = CredentialsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if key.is_empty() {
            return Err(CredentialsError::Empty);
        }
        match key.split_once(':') {
            Some((id, secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Self { id: id.to_string(), secret: secret.to_string() })
            }
            _ => Err(CredentialsError::Malformed),
        }
    }
}

/// Builds the HTTP client shared by a backend's requests.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(timeout: std::time::Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
