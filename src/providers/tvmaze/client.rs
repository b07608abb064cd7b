use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{SearchHit, TvMazeCastCredit, TvMazePerson, SOURCE};
use crate::config::ProviderSettings;
use crate::error::ProviderResult;
use crate::providers::http::JsonFetcher;
use crate::providers::wikipedia::WikipediaClient;
use crate::providers::ProviderClient;

/// Seeds searched for the "popular" round; TVMaze has no popularity endpoint.
const POPULAR_SEEDS_USED: usize = 4;
const POPULAR_HITS_PER_SEED: usize = 2;
const POPULAR_LIMIT: usize = 8;
/// Upper bound on the whole Wikipedia enrichment of one person.
const ENRICH_BUDGET: Duration = Duration::from_secs(4);

pub struct TvMazeClient {
    fetcher: JsonFetcher,
    wiki: Option<WikipediaClient>,
}

impl TvMazeClient {
    pub fn new(settings: ProviderSettings, wiki: Option<WikipediaClient>) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: JsonFetcher::new(SOURCE, settings)?,
            wiki,
        })
    }
}

#[async_trait]
impl ProviderClient for TvMazeClient {
    type Person = TvMazePerson;
    type Credit = TvMazeCastCredit;

    fn source(&self) -> &'static str {
        SOURCE
    }

    fn person_id(&self, person: &TvMazePerson) -> String {
        person.id.to_string()
    }

    async fn search(&self, query: &str) -> ProviderResult<Vec<TvMazePerson>> {
        let url = self.fetcher.url("/search/people");
        let hits: Vec<SearchHit> = self
            .fetcher
            .get_json(|c| c.get(&url).query(&[("q", query)]))
            .await?;
        debug!(provider = SOURCE, query, hits = hits.len(), "search");
        Ok(hits.into_iter().map(|h| h.person).collect())
    }

    async fn popular(&self) -> ProviderResult<Vec<TvMazePerson>> {
        let seeds: Vec<&String> = self
            .fetcher
            .settings()
            .popular_seeds
            .iter()
            .take(POPULAR_SEEDS_USED)
            .collect();
        let results = join_all(seeds.iter().map(|seed| self.search(seed))).await;

        let mut people = Vec::new();
        let mut seen = HashSet::new();
        let mut last_err = None;
        let mut answered = 0usize;
        for (seed, result) in seeds.iter().zip(results) {
            match result {
                Ok(found) => {
                    answered += 1;
                    for person in found.into_iter().take(POPULAR_HITS_PER_SEED) {
                        if seen.insert(person.id) {
                            people.push(person);
                        }
                    }
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
        people.truncate(POPULAR_LIMIT);
        info!(provider = SOURCE, count = people.len(), "popular people resolved");
        Ok(people)
    }

    async fn fetch_details(&self, id: &str) -> ProviderResult<Option<TvMazePerson>> {
        let url = self.fetcher.url(&format!("/people/{id}"));
        self.fetcher.get_json_opt(|c| c.get(&url)).await
    }

    async fn fetch_credits(&self, id: &str) -> ProviderResult<Vec<TvMazeCastCredit>> {
        let url = self.fetcher.url(&format!("/people/{id}/castcredits"));
        let credits = self
            .fetcher
            .get_json_opt(|c| {
                c.get(&url)
                    .query(&[("embed[]", "show"), ("embed[]", "character")])
            })
            .await?;
        Ok(credits.unwrap_or_default())
    }

    async fn enrich(&self, mut person: TvMazePerson) -> TvMazePerson {
        let Some(wiki) = &self.wiki else {
            return person;
        };
        match tokio::time::timeout(ENRICH_BUDGET, wiki.person_summary(&person.name)).await {
            Ok(summary) => person.wiki = summary,
            Err(_) => debug!(provider = SOURCE, name = %person.name, "wikipedia enrichment timed out"),
        }
        person
    }
}
