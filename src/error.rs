use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Android push not configured")]
    NotConfigured,
    #[error("Device map not found: {0}")]
    MapNotFound(#[source] std::io::Error),
    #[error("Device map is not a JSON object of strings: {0}")]
    MapUnmarshal(#[source] serde_json::Error),
    #[error("No device map entry for {0}")]
    NoMapEntry(String),
    #[error("Failed to acquire access token: {0}")]
    Token(#[from] TokenError),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rejected by backend ({code}): {message}")]
    Rejected { code: i64, message: String },
}

impl PushError {
    /// Business rejection from a backend. An empty message falls back to the code.
    #[must_use]
    pub fn rejected(code: i64, message: String) -> Self {
        let message = if message.is_empty() { format!("error {code}") } else { message };
        Self::Rejected { code, message }
    }

    /// Short reason reported to callers and attached to failure metrics.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::NotConfigured => "android push not configured",
            Self::MapNotFound(_) => "Map not found error",
            Self::MapUnmarshal(_) => "Unmarshal map error",
            Self::NoMapEntry(_) => "No map error",
            Self::Token(_) => "Getting token error",
            Self::Transport(_) => "unknown transport error",
            Self::InvalidResponse(_) => "invalid response",
            Self::Rejected { message, .. } => message,
        }
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("No app credentials configured")]
    MissingCredentials,
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Token endpoint returned status {0}")]
    Status(StatusCode),
    #[error("Malformed token response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Token endpoint rejected credentials ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("Token lifetime of {0}s is out of range")]
    InvalidExpiry(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("API key is empty")]
    Empty,
    #[error("API key must have the form <id>:<secret>")]
    Malformed,
}
