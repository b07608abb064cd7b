use std::time::Duration;

use crate::util::env::{env_flag, env_list, env_opt, env_parse};

/// Transport and normalization tuning for one provider.
///
/// Defaults mirror what each upstream tolerates; every field can be
/// overridden through `<PREFIX>_*` environment variables.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// How many search hits get a credits lookup and are normalized.
    pub search_cap: usize,
    /// Same for the "popular" round.
    pub popular_cap: usize,
    /// Minimum fun-fact count after padding.
    pub fun_facts_min: usize,
    pub popular_seeds: Vec<String>,
}

impl ProviderSettings {
    pub fn tvmaze_defaults() -> Self {
        Self {
            base_url: "https://api.tvmaze.com".to_string(),
            timeout: Duration::from_secs(8),
            max_retries: 2,
            backoff_ms: 1000,
            search_cap: 6,
            popular_cap: 4,
            fun_facts_min: 8,
            popular_seeds: ["Rachel Zegler", "Emma Stone", "Ryan Gosling", "Timothee"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn thetvdb_defaults() -> Self {
        Self {
            base_url: "https://api4.thetvdb.com/v4".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 1,
            backoff_ms: 2000,
            search_cap: 4,
            popular_cap: 4,
            fun_facts_min: 8,
            popular_seeds: ["Pedro Pascal", "Millie Bobby Brown", "Henry Cavill", "Anya Taylor"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn tmdb_defaults() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 0,
            backoff_ms: 500,
            search_cap: 4,
            popular_cap: 4,
            fun_facts_min: 5,
            popular_seeds: Vec::new(),
        }
    }

    /// Apply `<PREFIX>_*` overrides on top of `defaults`.
    pub fn from_env(prefix: &str, defaults: Self) -> Self {
        let key = |suffix: &str| format!("{prefix}_{suffix}");
        let mut cfg = defaults;
        if let Some(url) = env_opt(&key("BASE_URL")) {
            cfg.base_url = url.trim().trim_end_matches('/').to_string();
        }
        let timeout_secs = env_parse(&key("TIMEOUT_SECS"), cfg.timeout.as_secs());
        cfg.timeout = Duration::from_secs(timeout_secs.max(1));
        cfg.max_retries = env_parse(&key("MAX_RETRIES"), cfg.max_retries).min(5);
        cfg.backoff_ms = env_parse(&key("BACKOFF_MS"), cfg.backoff_ms);
        cfg.search_cap = env_parse(&key("SEARCH_CAP"), cfg.search_cap).max(1);
        cfg.popular_cap = env_parse(&key("POPULAR_CAP"), cfg.popular_cap).max(1);
        cfg.fun_facts_min = env_parse(&key("FUN_FACTS_MIN"), cfg.fun_facts_min);
        if let Some(seeds) = env_list(&key("POPULAR_SEEDS")) {
            cfg.popular_seeds = seeds;
        }
        cfg
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

/// Knobs for the aggregation round itself.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Queries shorter than this (in chars, after trimming) stay local.
    pub min_query_len: usize,
    pub wikipedia_enrich: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_query_len: 3,
            wikipedia_enrich: true,
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_query_len: env_parse("AGGREGATOR_MIN_QUERY_LEN", defaults.min_query_len).max(1),
            wikipedia_enrich: env_flag("WIKIPEDIA_ENRICH", defaults.wikipedia_enrich),
        }
    }
}
