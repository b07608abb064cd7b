//! Provider clients, their normalizers, and the glue that runs one provider
//! through a fan-out round.

pub mod http;
pub mod thetvdb;
pub mod tmdb;
pub mod tvmaze;
pub mod wikipedia;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{AggregatorConfig, ProviderSettings};
use crate::error::{ProviderError, ProviderResult};
use crate::model::Actor;
use crate::util::env::env_opt;

/// Network side of one external data source.
///
/// `search` and `popular` return an empty list when nothing matches; only
/// transport, auth and decode failures are errors.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    type Person: Clone + Send + Sync + 'static;
    type Credit: Send + Sync + 'static;

    /// Source tag used as the id namespace (`tvmaze`, `tvdb`, ...).
    fn source(&self) -> &'static str;

    fn person_id(&self, person: &Self::Person) -> String;

    async fn search(&self, query: &str) -> ProviderResult<Vec<Self::Person>>;

    async fn popular(&self) -> ProviderResult<Vec<Self::Person>>;

    async fn fetch_details(&self, id: &str) -> ProviderResult<Option<Self::Person>>;

    async fn fetch_credits(&self, id: &str) -> ProviderResult<Vec<Self::Credit>>;

    /// Optional best-effort enrichment before normalization. Must not fail.
    async fn enrich(&self, person: Self::Person) -> Self::Person {
        person
    }
}

/// Pure mapping from provider records to the canonical `Actor`.
pub trait RecordNormalizer: Send + Sync {
    type Person;
    type Credit;

    fn normalize(&self, raw: &Self::Person, credits: Option<&[Self::Credit]>) -> Actor;
}

/// What one provider contributed to a round.
#[derive(Debug)]
pub enum ProviderOutcome {
    Records(Vec<Actor>),
    Unavailable(ProviderError),
}

/// Which upstream call seeds a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind<'a> {
    Popular,
    Search(&'a str),
}

/// Object-safe view of a client + normalizer pair, as stored in the
/// aggregator's provider table.
#[async_trait]
pub trait ActorSource: Send + Sync {
    fn source(&self) -> &'static str;

    async fn gather(&self, round: RoundKind<'_>) -> ProviderOutcome;

    /// Resolve one provider id (without namespace prefix).
    async fn lookup(&self, provider_id: &str) -> ProviderResult<Option<Actor>>;
}

/// Runs a client through search/popular, credits, enrichment and
/// normalization.
pub struct Pipeline<C, N> {
    client: C,
    normalizer: N,
    search_cap: usize,
    popular_cap: usize,
}

impl<C, N> Pipeline<C, N>
where
    C: ProviderClient,
    N: RecordNormalizer<Person = C::Person, Credit = C::Credit>,
{
    pub fn new(client: C, normalizer: N, search_cap: usize, popular_cap: usize) -> Self {
        Self {
            client,
            normalizer,
            search_cap: search_cap.max(1),
            popular_cap: popular_cap.max(1),
        }
    }

    async fn build_actor(&self, person: C::Person) -> Actor {
        let id = self.client.person_id(&person);
        let credits = match self.client.fetch_credits(&id).await {
            Ok(credits) => Some(credits),
            Err(err) => {
                warn!(
                    provider = self.client.source(),
                    person_id = %id,
                    error = %err,
                    "credits lookup failed; normalizing without credits"
                );
                None
            }
        };
        let person = self.client.enrich(person).await;
        self.normalizer.normalize(&person, credits.as_deref())
    }
}

#[async_trait]
impl<C, N> ActorSource for Pipeline<C, N>
where
    C: ProviderClient,
    N: RecordNormalizer<Person = C::Person, Credit = C::Credit>,
{
    fn source(&self) -> &'static str {
        self.client.source()
    }

    async fn gather(&self, round: RoundKind<'_>) -> ProviderOutcome {
        let (raw, cap) = match round {
            RoundKind::Popular => (self.client.popular().await, self.popular_cap),
            RoundKind::Search(q) => (self.client.search(q).await, self.search_cap),
        };
        let people = match raw {
            Ok(people) => people,
            Err(err) => return ProviderOutcome::Unavailable(err),
        };
        debug!(
            provider = self.client.source(),
            hits = people.len(),
            cap,
            "raw records received"
        );
        let actors = join_all(
            people
                .into_iter()
                .take(cap)
                .map(|person| self.build_actor(person)),
        )
        .await;
        ProviderOutcome::Records(actors)
    }

    async fn lookup(&self, provider_id: &str) -> ProviderResult<Option<Actor>> {
        let Some(person) = self.client.fetch_details(provider_id).await? else {
            return Ok(None);
        };
        Ok(Some(self.build_actor(person).await))
    }
}

/// Builds the provider table in priority order: TVMaze (primary), TheTVDB,
/// then TMDB when an api key is configured.
pub fn default_sources(config: &AggregatorConfig) -> Result<Vec<Arc<dyn ActorSource>>> {
    let mut sources: Vec<Arc<dyn ActorSource>> = Vec::new();

    let tvmaze_cfg = ProviderSettings::from_env("TVMAZE", ProviderSettings::tvmaze_defaults());
    let wiki = if config.wikipedia_enrich {
        Some(wikipedia::WikipediaClient::new()?)
    } else {
        None
    };
    sources.push(Arc::new(Pipeline::new(
        tvmaze::TvMazeClient::new(tvmaze_cfg.clone(), wiki)?,
        tvmaze::TvMazeNormalizer::new(tvmaze_cfg.fun_facts_min),
        tvmaze_cfg.search_cap,
        tvmaze_cfg.popular_cap,
    )));

    let tvdb_cfg = ProviderSettings::from_env("THETVDB", ProviderSettings::thetvdb_defaults());
    sources.push(Arc::new(Pipeline::new(
        thetvdb::TvdbClient::new(tvdb_cfg.clone(), env_opt("THETVDB_API_KEY"))?,
        thetvdb::TvdbNormalizer::new(tvdb_cfg.fun_facts_min),
        tvdb_cfg.search_cap,
        tvdb_cfg.popular_cap,
    )));

    if let Some(api_key) = env_opt("TMDB_API_KEY") {
        let tmdb_cfg = ProviderSettings::from_env("TMDB", ProviderSettings::tmdb_defaults());
        sources.push(Arc::new(Pipeline::new(
            tmdb::TmdbClient::new(tmdb_cfg.clone(), api_key)?,
            tmdb::TmdbNormalizer::new(tmdb_cfg.fun_facts_min),
            tmdb_cfg.search_cap,
            tmdb_cfg.popular_cap,
        )));
    }

    info!(
        providers = ?sources.iter().map(|s| s.source()).collect::<Vec<_>>(),
        "provider table ready"
    );
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Clone)]
    struct FakePerson {
        id: u32,
        name: &'static str,
    }

    struct FakeClient {
        people: Vec<FakePerson>,
        fail_search: bool,
        fail_credits: bool,
        credit_calls: AtomicUsize,
    }

    impl FakeClient {
        fn new(count: u32) -> Self {
            Self {
                people: (1..=count).map(|id| FakePerson { id, name: "Fake Person" }).collect(),
                fail_search: false,
                fail_credits: false,
                credit_calls: AtomicUsize::new(0),
            }
        }
    }

    fn unavailable() -> ProviderError {
        ProviderError::NotConfigured {
            provider: "fake",
            what: "stub",
        }
    }

    #[async_trait]
    impl ProviderClient for FakeClient {
        type Person = FakePerson;
        type Credit = String;

        fn source(&self) -> &'static str {
            "fake"
        }

        fn person_id(&self, person: &FakePerson) -> String {
            person.id.to_string()
        }

        async fn search(&self, _query: &str) -> ProviderResult<Vec<FakePerson>> {
            if self.fail_search {
                return Err(unavailable());
            }
            Ok(self.people.clone())
        }

        async fn popular(&self) -> ProviderResult<Vec<FakePerson>> {
            self.search("").await
        }

        async fn fetch_details(&self, id: &str) -> ProviderResult<Option<FakePerson>> {
            Ok(self.people.iter().find(|p| p.id.to_string() == id).cloned())
        }

        async fn fetch_credits(&self, _id: &str) -> ProviderResult<Vec<String>> {
            self.credit_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_credits {
                return Err(unavailable());
            }
            Ok(vec!["Credit".to_string()])
        }
    }

    struct FakeNormalizer;

    impl RecordNormalizer for FakeNormalizer {
        type Person = FakePerson;
        type Credit = String;

        fn normalize(&self, raw: &FakePerson, credits: Option<&[String]>) -> Actor {
            Actor {
                id: format!("fake-{}", raw.id),
                name: raw.name.to_string(),
                age: 30,
                image: "https://img".into(),
                filmography: credits.map(|c| c.to_vec()).unwrap_or_default(),
                ..Actor::default()
            }
        }
    }

    fn records(outcome: ProviderOutcome) -> Vec<Actor> {
        match outcome {
            ProviderOutcome::Records(actors) => actors,
            ProviderOutcome::Unavailable(err) => panic!("unexpected failure: {err}"),
        }
    }

    #[tokio::test]
    async fn caps_apply_per_round_kind() {
        let pipeline = Pipeline::new(FakeClient::new(10), FakeNormalizer, 6, 4);
        assert_eq!(records(pipeline.gather(RoundKind::Search("fake")).await).len(), 6);
        let popular = records(pipeline.gather(RoundKind::Popular).await);
        let ids: Vec<_> = popular.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["fake-1", "fake-2", "fake-3", "fake-4"]);
        assert_eq!(pipeline.client.credit_calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn failed_credits_normalize_without_them() {
        let mut client = FakeClient::new(2);
        client.fail_credits = true;
        let pipeline = Pipeline::new(client, FakeNormalizer, 6, 4);
        let actors = records(pipeline.gather(RoundKind::Search("fake")).await);
        assert_eq!(actors.len(), 2);
        assert!(actors.iter().all(|a| a.filmography.is_empty()));
    }

    #[tokio::test]
    async fn search_failure_is_reported_not_raised() {
        let mut client = FakeClient::new(2);
        client.fail_search = true;
        let pipeline = Pipeline::new(client, FakeNormalizer, 6, 4);
        assert!(matches!(
            pipeline.gather(RoundKind::Popular).await,
            ProviderOutcome::Unavailable(ProviderError::NotConfigured { .. })
        ));
        assert_eq!(pipeline.client.credit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_builds_one_actor() {
        let pipeline = Pipeline::new(FakeClient::new(3), FakeNormalizer, 6, 4);
        let actor = pipeline.lookup("2").await.unwrap().unwrap();
        assert_eq!(actor.id, "fake-2");
        assert_eq!(actor.filmography, vec!["Credit"]);
        assert!(pipeline.lookup("99").await.unwrap().is_none());
    }
}
