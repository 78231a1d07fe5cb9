use clap::{Args, Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// JSON file holding the notification to dispatch (reads stdin when omitted)
    #[arg(long, env = "PUSH_RELAY_NOTIFICATION")]
    pub notification: Option<PathBuf>,

    #[command(flatten)]
    pub push: PushConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum BackendType {
    /// JPush vendor push cloud
    Jpush,
    /// WeChat official account template messages
    Wechat,
}

impl BackendType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpush => "jpush",
            Self::Wechat => "wechat",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Args)]
pub struct PushConfig {
    /// Backend used to deliver the notification
    #[arg(long, env = "PUSH_RELAY_BACKEND", value_enum, default_value_t = BackendType::Jpush)]
    pub backend: BackendType,

    /// JPush credentials as <app_key>:<master_secret>
    #[arg(long, env = "PUSH_RELAY_JPUSH_API_KEY", default_value = "", hide_env_values = true)]
    pub jpush_api_key: String,

    /// WeChat credentials as <app_id>:<app_secret>
    #[arg(long, env = "PUSH_RELAY_WECHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub wechat_api_key: String,

    /// Base URL of the JPush REST API
    #[arg(long, env = "PUSH_RELAY_JPUSH_API_URL", default_value = "https://api.jpush.cn")]
    pub jpush_api_url: String,

    /// Base URL of the WeChat API
    #[arg(long, env = "PUSH_RELAY_WECHAT_API_URL", default_value = "https://api.weixin.qq.com")]
    pub wechat_api_url: String,

    /// JSON file mapping device ids to WeChat open ids
    #[arg(long, env = "PUSH_RELAY_WECHAT_DEVICE_MAP", default_value = "./config/wechat-device-ids.json")]
    pub wechat_device_map: PathBuf,

    /// WeChat template used for chat notifications
    #[arg(long, env = "PUSH_RELAY_WECHAT_TEMPLATE_ID", default_value = "3qW96y74I5Wari8oFvmu82fj9yS4LNyfPrmtLadydrI")]
    pub wechat_template_id: String,

    /// Per-request timeout for backend HTTP calls
    #[arg(long, env = "PUSH_RELAY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl PushConfig {
    #[must_use]
    pub fn api_key(&self, backend: BackendType) -> &str {
        match backend {
            BackendType::Jpush => &self.jpush_api_key,
            BackendType::Wechat => &self.wechat_api_key,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "PUSH_RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint for traces and metrics (disabled when omitted)
    #[arg(long, env = "PUSH_RELAY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
