use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Envelope, SOURCE};
use crate::error::{ProviderError, ProviderResult};
use crate::providers::http::{truncate_for_log, JsonFetcher};

/// TheTVDB tokens last a month; we refresh well before that.
pub const TOKEN_TTL: Duration = Duration::from_secs(20 * 60 * 60);
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Clone)]
struct TvdbToken {
    value: String,
    expires_at: Instant,
}

/// Session token cache shared by all requests of one client.
#[derive(Debug, Clone)]
pub struct TokenCache {
    fetcher: JsonFetcher,
    api_key: Option<String>,
    ttl: Duration,
    token: Arc<Mutex<Option<TvdbToken>>>,
}

impl TokenCache {
    pub fn new(fetcher: JsonFetcher, api_key: Option<String>) -> Self {
        Self::with_ttl(fetcher, api_key, TOKEN_TTL)
    }

    pub fn with_ttl(fetcher: JsonFetcher, api_key: Option<String>, ttl: Duration) -> Self {
        Self {
            fetcher,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            ttl,
            token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// A valid bearer token, logging in when none is cached or it expired.
    ///
    /// The lock is held across the login so concurrent callers share one.
    pub async fn bearer(&self) -> ProviderResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
            debug!(provider = SOURCE, "cached token expired");
        }
        let token = self.login().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    /// Drop the cached token if it is still the one the API rejected. A
    /// token another caller already refreshed is left alone.
    pub async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.lock().await;
        if guard.as_ref().is_some_and(|t| t.value == rejected) {
            *guard = None;
        }
    }

    async fn login(&self) -> ProviderResult<TvdbToken> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured {
            provider: SOURCE,
            what: "THETVDB_API_KEY",
        })?;
        let response = self
            .fetcher
            .client()
            .post(self.fetcher.url("/login"))
            .json(&json!({ "apikey": api_key }))
            .send()
            .await
            .map_err(|e| self.fetcher.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth {
                provider: SOURCE,
                reason: format!("login returned {status}: {}", truncate_for_log(body, 200)),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.fetcher.transport_error(e))?;
        let envelope: Envelope<LoginData> =
            serde_json::from_slice(&bytes).map_err(|source| ProviderError::Decode {
                provider: SOURCE,
                source,
            })?;
        let data = envelope.into_success().ok_or_else(|| ProviderError::Auth {
            provider: SOURCE,
            reason: "login response carried no token".to_string(),
        })?;
        info!(provider = SOURCE, "authenticated");
        Ok(TvdbToken {
            value: data.token,
            expires_at: Instant::now() + self.ttl,
        })
    }
}
