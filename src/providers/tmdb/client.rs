use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use super::{CombinedCredits, Page, TmdbPerson, TmdbWork, SOURCE};
use crate::config::ProviderSettings;
use crate::error::ProviderResult;
use crate::providers::http::JsonFetcher;
use crate::providers::ProviderClient;

pub struct TmdbClient {
    fetcher: JsonFetcher,
    api_key: String,
}

impl TmdbClient {
    pub fn new(settings: ProviderSettings, api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: JsonFetcher::new(SOURCE, settings)?,
            api_key,
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        params: &'a [(&'a str, &'a str)],
    ) -> impl Fn(&Client) -> RequestBuilder + 'a {
        move |c: &Client| {
            c.get(url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(params)
        }
    }
}

#[async_trait]
impl ProviderClient for TmdbClient {
    type Person = TmdbPerson;
    type Credit = TmdbWork;

    fn source(&self) -> &'static str {
        SOURCE
    }

    fn person_id(&self, person: &TmdbPerson) -> String {
        person.id.to_string()
    }

    async fn search(&self, query: &str) -> ProviderResult<Vec<TmdbPerson>> {
        let url = self.fetcher.url("/search/person");
        let page: Page<TmdbPerson> = self
            .fetcher
            .get_json(self.get(&url, &[("query", query), ("include_adult", "false")]))
            .await?;
        debug!(provider = SOURCE, query, hits = page.results.len(), "search");
        Ok(page.results)
    }

    async fn popular(&self) -> ProviderResult<Vec<TmdbPerson>> {
        let url = self.fetcher.url("/person/popular");
        let page: Page<TmdbPerson> = self.fetcher.get_json(self.get(&url, &[("page", "1")])).await?;
        Ok(page.results)
    }

    /// Person record with external ids appended.
    async fn fetch_details(&self, id: &str) -> ProviderResult<Option<TmdbPerson>> {
        let url = self.fetcher.url(&format!("/person/{id}"));
        self.fetcher
            .get_json_opt(self.get(&url, &[("append_to_response", "external_ids")]))
            .await
    }

    async fn fetch_credits(&self, id: &str) -> ProviderResult<Vec<TmdbWork>> {
        let url = self.fetcher.url(&format!("/person/{id}/combined_credits"));
        let credits: Option<CombinedCredits> = self.fetcher.get_json_opt(self.get(&url, &[])).await?;
        Ok(credits.map(|c| c.cast).unwrap_or_default())
    }

    /// Search hits lack biography, birthday and social ids.
    async fn enrich(&self, mut person: TmdbPerson) -> TmdbPerson {
        if person.birthday.is_some() || person.biography.is_some() {
            return person;
        }
        match self.fetch_details(&person.id.to_string()).await {
            Ok(Some(details)) => person.merge_details(details),
            Ok(None) => debug!(provider = SOURCE, id = person.id, "no person details"),
            Err(err) => warn!(provider = SOURCE, id = person.id, error = %err, "person details failed"),
        }
        person
    }
}
