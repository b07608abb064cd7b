//! Fans a request out to every provider, substitutes fallback data for the
//! ones that fail, and merges the lot into one de-duplicated list.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::AggregatorConfig;
use crate::fallback::{self, FallbackCatalog};
use crate::model::{Actor, Aggregation, ProviderStatus, StatusMap};
use crate::providers::{self, ActorSource, ProviderOutcome, RoundKind};

/// Last popular set and status map, each stamped with the round that wrote
/// it. A round that started earlier never overwrites a later one.
#[derive(Debug)]
struct Memo {
    popular: Option<Vec<Actor>>,
    popular_round: u64,
    status: StatusMap,
    status_round: u64,
}

impl Memo {
    fn record_status(&mut self, round: u64, status: &StatusMap) {
        if round > self.status_round {
            self.status = status.clone();
            self.status_round = round;
        }
    }

    fn record_popular(&mut self, round: u64, actors: &[Actor]) {
        if round > self.popular_round {
            self.popular = Some(actors.to_vec());
            self.popular_round = round;
        }
    }
}

pub struct AggregationController {
    sources: Vec<Arc<dyn ActorSource>>,
    catalog: FallbackCatalog,
    config: AggregatorConfig,
    memo: RwLock<Memo>,
    rounds: AtomicU64,
}

impl AggregationController {
    /// `sources` are in priority order; earlier sources win id collisions.
    pub fn new(
        sources: Vec<Arc<dyn ActorSource>>,
        catalog: FallbackCatalog,
        config: AggregatorConfig,
    ) -> Self {
        let status = sources
            .iter()
            .map(|s| (s.source().to_string(), ProviderStatus::Unknown))
            .collect();
        Self {
            sources,
            catalog,
            config,
            memo: RwLock::new(Memo {
                popular: None,
                popular_round: 0,
                status,
                status_round: 0,
            }),
            rounds: AtomicU64::new(0),
        }
    }

    /// Controller over the default provider table and the embedded catalog.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AggregatorConfig::from_env();
        let sources = providers::default_sources(&config)?;
        Ok(Self::new(sources, FallbackCatalog::new(), config))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.source()).collect()
    }

    /// Status map of the most recent round (all `unknown` before the first).
    pub fn last_status(&self) -> StatusMap {
        self.memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .clone()
    }

    pub async fn load_popular(&self) -> Aggregation {
        let round = self.next_round();
        let result = self.run_round(RoundKind::Popular, "").await;
        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        memo.record_popular(round, &result.actors);
        memo.record_status(round, &result.status);
        result
    }

    /// Short queries, and empty ones whatever the threshold, are answered
    /// locally from the last popular set.
    pub async fn search(&self, query: &str) -> Aggregation {
        let query = query.trim();
        if query.is_empty() || query.chars().count() < self.config.min_query_len {
            return self.local_search(query);
        }
        let round = self.next_round();
        let result = self.run_round(RoundKind::Search(query), query).await;
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .record_status(round, &result.status);
        result
    }

    /// Resolve a namespaced id (`tvmaze-1`, `fallback-zendaya`, ...).
    pub async fn lookup(&self, id: &str) -> Option<Actor> {
        let Some((tag, provider_id)) = id.split_once('-') else {
            warn!(id, "lookup id has no source prefix");
            return None;
        };
        if tag == fallback::SOURCE {
            return self.catalog.get(id);
        }
        let Some(source) = self.sources.iter().find(|s| s.source() == tag) else {
            warn!(id, source = tag, "no provider registered for lookup");
            return None;
        };
        match source.lookup(provider_id).await {
            Ok(found) => found,
            Err(err) => {
                warn!(id, error = %err, "lookup failed");
                None
            }
        }
    }

    fn next_round(&self) -> u64 {
        self.rounds.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn local_search(&self, query: &str) -> Aggregation {
        let needle = query.to_lowercase();
        let memo = self.memo.read().unwrap_or_else(PoisonError::into_inner);
        let actors = match &memo.popular {
            Some(popular) => popular
                .iter()
                .filter(|a| a.name_matches(&needle))
                .cloned()
                .collect(),
            None => self.catalog.matching(query),
        };
        debug!(query, hits = actors.len(), "short query answered locally");
        Aggregation {
            actors,
            status: memo.status.clone(),
        }
    }

    async fn run_round(&self, round: RoundKind<'_>, query: &str) -> Aggregation {
        let outcomes = join_all(self.sources.iter().map(|s| s.gather(round))).await;
        let fallback = self.catalog.matching(query);

        if self.sources.is_empty() {
            return Aggregation {
                actors: fallback,
                status: StatusMap::new(),
            };
        }

        let mut actors = Vec::new();
        let mut seen = HashSet::new();
        let mut status = StatusMap::new();
        for (source, outcome) in self.sources.iter().zip(outcomes) {
            let provider = source.source();
            let (state, contributed) = match outcome {
                ProviderOutcome::Records(found) if !found.is_empty() => {
                    (ProviderStatus::Online, found)
                }
                ProviderOutcome::Records(_) => {
                    info!(provider, ?round, "provider returned no records; using fallback");
                    (ProviderStatus::Offline, fallback.clone())
                }
                ProviderOutcome::Unavailable(err) => {
                    warn!(provider, ?round, error = %err, "provider unavailable; using fallback");
                    (ProviderStatus::Offline, fallback.clone())
                }
            };
            status.insert(provider.to_string(), state);
            for actor in contributed {
                if seen.insert(actor.id.clone()) {
                    actors.push(actor);
                }
            }
        }
        info!(
            ?round,
            actors = actors.len(),
            online = status.values().filter(|s| **s == ProviderStatus::Online).count(),
            providers = status.len(),
            "aggregation round complete"
        );
        Aggregation { actors, status }
    }
}
