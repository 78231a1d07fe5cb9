use crate::adapters::push::device_map::DeviceMap;
use crate::adapters::push::token_cache::AccessTokenCache;
use crate::adapters::push::{ApiCredentials, PushBackend};
use crate::config::BackendType;
use crate::domain::PushNotification;
use crate::domain::payload::display_sender;
use crate::error::{CredentialsError, PushError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const CONTENT_TYPE: &str = "application/json;encoding=utf-8";

/// Error codes meaning the access token is no longer accepted.
const STALE_TOKEN_CODES: [i64; 3] = [40001, 40014, 42001];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordData {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateMessage {
    pub touser: String,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub data: HashMap<String, KeywordData>,
}

impl TemplateMessage {
    #[must_use]
    pub fn for_notification(msg: &PushNotification, touser: String, template_id: &str) -> Self {
        let content = KeywordData { value: format!("{}: {}", display_sender(msg), msg.message), color: None };
        Self {
            touser,
            template_id: template_id.to_string(),
            url: None,
            data: HashMap::from([("content".to_string(), content)]),
        }
    }
}

#[derive(Debug)]
pub struct TemplateRequest {
    access_token: String,
    message: TemplateMessage,
}

#[derive(Debug, Deserialize)]
struct WechatReply {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug)]
pub struct WechatBackend {
    http: reqwest::Client,
    send_url: String,
    api_key: String,
    template_id: String,
    device_map: DeviceMap,
    tokens: AccessTokenCache,
}

impl WechatBackend {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        api_base: &str,
        api_key: impl Into<String>,
        template_id: impl Into<String>,
        device_map: DeviceMap,
    ) -> Self {
        let api_key = api_key.into();
        let tokens = AccessTokenCache::new(http.clone(), api_base, api_key.parse().ok());
        Self {
            http,
            send_url: format!("{}/cgi-bin/message/template/send", api_base.trim_end_matches('/')),
            api_key,
            template_id: template_id.into(),
            device_map,
            tokens,
        }
    }
}

#[async_trait]
impl PushBackend for WechatBackend {
    type Request = TemplateRequest;

    fn backend_type(&self) -> BackendType {
        BackendType::Wechat
    }

    fn check_credentials(&self) -> Result<(), CredentialsError> {
        self.api_key.parse::<ApiCredentials>().map(|_| ())
    }

    async fn build_request(&self, msg: &PushNotification) -> Result<Self::Request, PushError> {
        let touser = self.device_map.resolve(&msg.device_id).await?;
        let message = TemplateMessage::for_notification(msg, touser, &self.template_id);
        let access_token = self.tokens.get_valid_token().await?;
        Ok(TemplateRequest { access_token, message })
    }

    async fn transmit(&self, request: Self::Request) -> Result<String, PushError> {
        let response = self
            .http
            .post(&self.send_url)
            .query(&[("access_token", request.access_token.as_str())])
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(&request.message)
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "WeChat responded");
        response.text().await.map_err(|e| PushError::InvalidResponse(e.to_string()))
    }

    async fn classify_response(&self, body: &str) -> Result<(), PushError> {
        let reply: WechatReply = serde_json::from_str(body).map_err(|e| PushError::InvalidResponse(e.to_string()))?;
        if reply.errcode == 0 {
            return Ok(());
        }

        if STALE_TOKEN_CODES.contains(&reply.errcode) {
            tracing::warn!(errcode = reply.errcode, "WeChat refused the access token, dropping it");
            self.tokens.invalidate().await;
        }
        Err(PushError::rejected(reply.errcode, reply.errmsg))
    }
}
