use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::auth::TokenCache;
use super::{Envelope, TvdbCredit, TvdbPerson, TvdbSearchResult, SOURCE};
use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::providers::http::JsonFetcher;
use crate::providers::ProviderClient;

const SEARCH_LIMIT: &str = "10";
const SEARCH_KEEP: usize = 8;

pub struct TvdbClient {
    fetcher: JsonFetcher,
    tokens: TokenCache,
}

impl TvdbClient {
    /// Without an API key the client still registers; every call then
    /// fails with `NotConfigured` and the source reports offline.
    pub fn new(settings: ProviderSettings, api_key: Option<String>) -> anyhow::Result<Self> {
        let fetcher = JsonFetcher::new(SOURCE, settings)?;
        let tokens = TokenCache::new(fetcher.clone(), api_key);
        if !tokens.has_key() {
            warn!(provider = SOURCE, "THETVDB_API_KEY not set; source will report offline");
        }
        Ok(Self { fetcher, tokens })
    }

    /// Authorized GET. A rejected token is dropped and the call is replayed
    /// once with a fresh login.
    async fn get_authed<T>(&self, path: &str, query: &[(&str, &str)]) -> ProviderResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.fetcher.url(path);
        let mut reauthenticated = false;
        loop {
            let token = self.tokens.bearer().await?;
            let result = self
                .fetcher
                .get_json_opt(|c| c.get(&url).query(query).bearer_auth(&token))
                .await;
            match result {
                Err(ProviderError::AuthRejected { status, .. }) if !reauthenticated => {
                    warn!(provider = SOURCE, %status, path, "token rejected; logging in again");
                    self.tokens.invalidate(&token).await;
                    reauthenticated = true;
                }
                other => return other,
            }
        }
    }

    async fn extended(&self, id: &str) -> ProviderResult<Option<TvdbPerson>> {
        let envelope: Option<Envelope<TvdbPerson>> = self
            .get_authed(&format!("/people/{id}/extended"), &[])
            .await?;
        Ok(envelope.and_then(Envelope::into_success))
    }
}

#[async_trait]
impl ProviderClient for TvdbClient {
    type Person = TvdbPerson;
    type Credit = TvdbCredit;

    fn source(&self) -> &'static str {
        SOURCE
    }

    fn person_id(&self, person: &TvdbPerson) -> String {
        person.id.to_string()
    }

    async fn search(&self, query: &str) -> ProviderResult<Vec<TvdbPerson>> {
        let envelope: Option<Envelope<Vec<TvdbSearchResult>>> = self
            .get_authed(
                "/search",
                &[("query", query), ("type", "person"), ("limit", SEARCH_LIMIT)],
            )
            .await?;
        let people: Vec<TvdbPerson> = envelope
            .and_then(Envelope::into_success)
            .unwrap_or_default()
            .into_iter()
            .filter(|hit| hit.kind.as_deref().map_or(true, |k| k == "person"))
            .filter_map(TvdbSearchResult::into_person)
            .take(SEARCH_KEEP)
            .collect();
        debug!(provider = SOURCE, query, hits = people.len(), "search");
        Ok(people)
    }

    /// First hit for each seed name, searched one after another.
    async fn popular(&self) -> ProviderResult<Vec<TvdbPerson>> {
        let mut people: Vec<TvdbPerson> = Vec::new();
        let mut last_err = None;
        let mut answered = 0usize;
        for seed in &self.fetcher.settings().popular_seeds {
            match self.search(seed).await {
                Ok(found) => {
                    answered += 1;
                    if let Some(first) = found.into_iter().next() {
                        if !people.iter().any(|p| p.id == first.id) {
                            people.push(first);
                        }
                    }
                }
                // Configuration and auth problems will not heal on the next seed.
                Err(
                    err @ (ProviderError::NotConfigured { .. }
                    | ProviderError::Auth { .. }
                    | ProviderError::AuthRejected { .. }),
                ) => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(provider = SOURCE, seed = %seed, error = %err, "popular seed search failed");
                    last_err = Some(err);
                }
            }
        }
        if answered == 0 {
            if let Some(err) = last_err {
                return Err(err);
            }
        }
        info!(provider = SOURCE, count = people.len(), "popular people resolved");
        Ok(people)
    }

    async fn fetch_details(&self, id: &str) -> ProviderResult<Option<TvdbPerson>> {
        self.extended(id).await
    }

    async fn fetch_credits(&self, id: &str) -> ProviderResult<Vec<TvdbCredit>> {
        Ok(self
            .extended(id)
            .await?
            .map(|person| person.characters)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::providers::http::test_support::stub_settings;

    #[derive(Clone)]
    struct Stub {
        logins: Arc<AtomicUsize>,
        /// Token the API accepts; `None` rejects everything.
        accepted: Option<&'static str>,
    }

    async fn login(stub: web::Data<Stub>) -> HttpResponse {
        let n = stub.logins.fetch_add(1, Ordering::SeqCst) + 1;
        HttpResponse::Ok().json(json!({"status": "success", "data": {"token": format!("tok-{n}")}}))
    }

    fn authorized(stub: &Stub, req: &HttpRequest) -> bool {
        let header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        stub.accepted.is_some_and(|t| header == format!("Bearer {t}"))
    }

    async fn search(stub: web::Data<Stub>, req: HttpRequest) -> HttpResponse {
        if !authorized(&stub, &req) {
            return HttpResponse::Unauthorized().finish();
        }
        assert!(req.query_string().contains("type=person"));
        HttpResponse::Ok().json(json!({"status": "success", "data": [
            {"tvdb_id": "290434", "name": "Pedro Pascal", "type": "person",
             "image_url": "https://art/pp.jpg", "translations": {"eng": "Chilean actor."}},
            {"tvdb_id": "77", "name": "The Pedro Show", "type": "series"},
            {"tvdb_id": "88", "name": "Pedro Other", "type": "person"}
        ]}))
    }

    async fn extended(stub: web::Data<Stub>, req: HttpRequest, path: web::Path<u64>) -> HttpResponse {
        if !authorized(&stub, &req) {
            return HttpResponse::Unauthorized().finish();
        }
        if path.into_inner() != 290434 {
            return HttpResponse::NotFound().finish();
        }
        HttpResponse::Ok().json(json!({"status": "success", "data": {
            "id": 290434, "name": "Pedro Pascal", "birth": "1975-04-02",
            "characters": [
                {"id": 1, "name": "Din Djarin", "seriesId": 10, "series": {"name": "The Mandalorian"}, "isFeatured": true},
                {"id": 2, "name": "Joel", "seriesId": 11, "series": {"name": "The Last of Us"}}
            ]
        }}))
    }

    async fn start(stub: Stub) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(stub.clone()))
                .route("/login", web::post().to(login))
                .route("/search", web::get().to(search))
                .route("/people/{id}/extended", web::get().to(extended))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    fn client(base: String, key: Option<&str>) -> TvdbClient {
        TvdbClient::new(stub_settings(base, 0), key.map(str::to_string)).unwrap()
    }

    #[actix_web::test]
    async fn search_keeps_people_only() {
        let logins = Arc::new(AtomicUsize::new(0));
        let base = start(Stub { logins: logins.clone(), accepted: Some("tok-1") }).await;
        let people = client(base, Some("key")).search("pedro").await.unwrap();
        let ids: Vec<u64> = people.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![290434, 88]);
        assert_eq!(people[0].biography.as_deref(), Some("Chilean actor."));
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn rejected_token_is_refreshed_once() {
        let logins = Arc::new(AtomicUsize::new(0));
        // first login yields tok-1 which the API refuses; tok-2 works
        let base = start(Stub { logins: logins.clone(), accepted: Some("tok-2") }).await;
        let tvdb = client(base, Some("key"));
        let credits = tvdb.fetch_credits("290434").await.unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(logins.load(Ordering::SeqCst), 2);

        // token now cached
        assert!(tvdb.fetch_details("290434").await.unwrap().is_some());
        assert!(tvdb.fetch_details("1").await.unwrap().is_none());
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn persistent_rejection_surfaces_after_one_retry() {
        let logins = Arc::new(AtomicUsize::new(0));
        let base = start(Stub { logins: logins.clone(), accepted: None }).await;
        let err = client(base, Some("key")).search("pedro").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::AuthRejected { status: StatusCode::UNAUTHORIZED, .. }
        ));
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn popular_stops_when_token_keeps_being_rejected() {
        let logins = Arc::new(AtomicUsize::new(0));
        let base = start(Stub { logins: logins.clone(), accepted: None }).await;
        let err = client(base, Some("key")).popular().await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthRejected { .. }));
        // one login plus one re-login, not two per seed
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn popular_takes_first_hit_per_seed() {
        let logins = Arc::new(AtomicUsize::new(0));
        let base = start(Stub { logins, accepted: Some("tok-1") }).await;
        let people = client(base, Some("key")).popular().await.unwrap();
        // both seeds return the same first hit
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Pedro Pascal");
    }

    #[actix_web::test]
    async fn missing_key_is_not_configured() {
        let tvdb = client("http://127.0.0.1:9".into(), None);
        assert!(matches!(
            tvdb.popular().await.unwrap_err(),
            ProviderError::NotConfigured { .. }
        ));
    }
}
