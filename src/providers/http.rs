use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};

const USER_AGENT: &str = "actor-infographic-aggregator/1.0";

/// Thin wrapper over `reqwest::Client` that applies one provider's timeout,
/// retry budget and backoff, and maps every failure onto `ProviderError`.
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    provider: &'static str,
    http: Client,
    settings: ProviderSettings,
}

impl JsonFetcher {
    pub fn new(provider: &'static str, settings: ProviderSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to construct {provider} HTTP client: {e}"))?;
        Ok(Self {
            provider,
            http,
            settings,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn client(&self) -> &Client {
        &self.http
    }

    /// `base_url` joined with `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// GET and decode JSON. 404 becomes `Ok(None)`.
    pub async fn get_json_opt<T, F>(&self, build: F) -> ProviderResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match self.send_once::<T, _>(&build).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.settings.max_retries => {
                    let wait = self.settings.backoff_for(attempt);
                    warn!(
                        provider = self.provider,
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "request failed; retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// GET and decode JSON; a 404 is reported as an HTTP status error.
    pub async fn get_json<T, F>(&self, build: F) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        self.get_json_opt(build)
            .await?
            .ok_or_else(|| ProviderError::Status {
                provider: self.provider,
                status: StatusCode::NOT_FOUND,
                body: String::new(),
            })
    }

    async fn send_once<T, F>(&self, build: &F) -> ProviderResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let request = build(&self.http).header("Accept", "application/json");
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!(provider = self.provider, url = %response.url(), %status, "response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthRejected {
                provider: self.provider,
                status,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: self.provider,
                status,
                body: truncate_for_log(body, 500),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ProviderError::Decode {
                provider: self.provider,
                source,
            })
    }

    pub fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider: self.provider,
                timeout: self.settings.timeout,
            }
        } else {
            ProviderError::Transport {
                provider: self.provider,
                source: err,
            }
        }
    }
}

pub(crate) fn truncate_for_log(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use crate::config::ProviderSettings;

    /// Settings pointing at a local stub server with fast retries.
    pub fn stub_settings(base_url: String, max_retries: u32) -> ProviderSettings {
        ProviderSettings {
            base_url,
            timeout: Duration::from_secs(2),
            max_retries,
            backoff_ms: 5,
            search_cap: 6,
            popular_cap: 4,
            fun_facts_min: 8,
            popular_seeds: vec!["Seed One".into(), "Seed Two".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::Value;

    use super::test_support::stub_settings;
    use super::*;

    async fn flaky(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
        if hits.fetch_add(1, Ordering::SeqCst) < 2 {
            HttpResponse::ServiceUnavailable().finish()
        } else {
            HttpResponse::Ok().json(serde_json::json!({"ok": true}))
        }
    }

    async fn start(hits: Arc<AtomicUsize>) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(hits.clone()))
                .route("/flaky", web::get().to(flaky))
                .route("/garbage", web::get().to(|| async { HttpResponse::Ok().body("not json") }))
                .route("/bad", web::get().to(|| async { HttpResponse::BadRequest().finish() }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    #[actix_web::test]
    async fn retries_transient_failures_then_succeeds() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = start(hits.clone()).await;
        let fetcher = JsonFetcher::new("stub", stub_settings(base, 2)).unwrap();
        let url = fetcher.url("/flaky");
        let body: Value = fetcher.get_json(|c| c.get(&url)).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[actix_web::test]
    async fn gives_up_after_retry_budget() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = start(hits.clone()).await;
        let fetcher = JsonFetcher::new("stub", stub_settings(base, 1)).unwrap();
        let url = fetcher.url("/flaky");
        let err = fetcher.get_json::<Value, _>(|c| c.get(&url)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn maps_missing_bad_and_undecodable_responses() {
        let base = start(Arc::new(AtomicUsize::new(0))).await;
        let fetcher = JsonFetcher::new("stub", stub_settings(base, 2)).unwrap();

        let missing = fetcher.url("/nope");
        let none: Option<Value> = fetcher.get_json_opt(|c| c.get(&missing)).await.unwrap();
        assert!(none.is_none());

        let bad = fetcher.url("/bad");
        let err = fetcher.get_json::<Value, _>(|c| c.get(&bad)).await.unwrap_err();
        assert!(!err.is_transient());

        let garbage = fetcher.url("/garbage");
        let err = fetcher.get_json::<Value, _>(|c| c.get(&garbage)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[actix_web::test]
    async fn unreachable_host_is_a_transport_error() {
        let fetcher =
            JsonFetcher::new("stub", stub_settings("http://127.0.0.1:9".into(), 0)).unwrap();
        let url = fetcher.url("/x");
        let err = fetcher.get_json::<Value, _>(|c| c.get(&url)).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn log_truncation_is_char_safe() {
        assert_eq!(truncate_for_log("żżż".into(), 3), "ż…");
        assert_eq!(truncate_for_log("abc".into(), 10), "abc");
    }
}
