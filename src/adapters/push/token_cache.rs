use crate::adapters::push::ApiCredentials;
use crate::error::TokenError;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Error body the token endpoint sends instead of a token.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Lazily refreshed WeChat access token.
///
/// Token and expiry are swapped as one value, so readers never pair a token
/// with another refresh's expiry.
#[derive(Debug)]
pub struct AccessTokenCache {
    http: reqwest::Client,
    token_url: String,
    credentials: Option<ApiCredentials>,
    cached: RwLock<Option<CachedToken>>,
}

impl AccessTokenCache {
    #[must_use]
    pub fn new(http: reqwest::Client, api_base: &str, credentials: Option<ApiCredentials>) -> Self {
        Self {
            http,
            token_url: format!("{}/cgi-bin/token", api_base.trim_end_matches('/')),
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// Returns the cached token, fetching a new one if it is missing or expired.
    ///
    /// # Errors
    /// Returns an error if the token endpoint is unreachable or its answer is unusable.
    /// The cache is left empty in that case.
    pub async fn get_valid_token(&self) -> Result<String, TokenError> {
        if let Some(token) = fresh_token(self.cached.read().await.as_ref()) {
            return Ok(token);
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = fresh_token(cached.as_ref()) {
            return Ok(token);
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn fetch(&self) -> Result<CachedToken, TokenError> {
        let Some(credentials) = &self.credentials else {
            return Err(TokenError::MissingCredentials);
        };

        let response = self
            .http
            .get(&self.token_url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", credentials.id.as_str()),
                ("secret", credentials.secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError::Status(status));
        }

        let body = response.text().await?;
        let token = parse_token_body(&body)?;
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(token.expires_in))
            .ok_or(TokenError::InvalidExpiry(token.expires_in))?;

        tracing::info!(expires_in = token.expires_in, "Refreshed WeChat access token");
        Ok(CachedToken { value: token.access_token, expires_at })
    }
}

fn fresh_token(cached: Option<&CachedToken>) -> Option<String> {
    cached.filter(|t| t.is_fresh_at(Instant::now())).map(|t| t.value.clone())
}

fn parse_token_body(body: &str) -> Result<TokenResponse, TokenError> {
    match serde_json::from_str::<TokenResponse>(body) {
        Ok(token) => Ok(token),
        Err(e) => match serde_json::from_str::<TokenErrorResponse>(body) {
            Ok(rejection) if rejection.errcode != 0 => {
                Err(TokenError::Rejected { code: rejection.errcode, message: rejection.errmsg })
            }
            _ => Err(TokenError::Decode(e)),
        },
    }
}
