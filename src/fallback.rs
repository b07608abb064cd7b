//! Static set of pre-normalized actors shown when providers are unavailable.

use std::sync::LazyLock;

use tracing::error;

use crate::model::Actor;

pub const SOURCE: &str = "fallback";

static EMBEDDED: &str = include_str!("../data/fallback_actors.json");

static BUILTIN: LazyLock<Vec<Actor>> = LazyLock::new(|| parse_catalog(EMBEDDED));

fn parse_catalog(raw: &str) -> Vec<Actor> {
    match serde_json::from_str::<Vec<Actor>>(raw) {
        Ok(actors) => actors,
        Err(err) => {
            error!(error = %err, "fallback catalog is corrupt; continuing without it");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    actors: Vec<Actor>,
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackCatalog {
    /// The embedded catalog.
    pub fn new() -> Self {
        Self {
            actors: BUILTIN.clone(),
        }
    }

    pub fn from_actors(actors: Vec<Actor>) -> Self {
        Self { actors }
    }

    /// Case-insensitive substring match on name; an empty query matches all.
    pub fn matching(&self, query: &str) -> Vec<Actor> {
        let needle = query.trim().to_lowercase();
        self.actors
            .iter()
            .filter(|a| a.name_matches(&needle))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Actor> {
        self.actors.iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn embedded_catalog_is_complete() {
        let catalog = FallbackCatalog::new();
        assert_eq!(catalog.len(), 6);
        let ids: HashSet<_> = catalog.matching("").into_iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), 6);
        for actor in catalog.matching("") {
            assert!(actor.id.starts_with("fallback-"), "{}", actor.id);
            assert_eq!(actor.source(), SOURCE);
            assert!(actor.age > 0);
            assert!(!actor.image.is_empty());
            assert!(!actor.net_worth.is_empty());
            assert!(!actor.fun_facts.is_empty());
        }
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        let catalog = FallbackCatalog::new();
        let hits = catalog.matching("  ZEND ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "fallback-zendaya");
        assert!(catalog.matching("t").len() > 2);
        assert!(catalog.matching("nobody at all").is_empty());
        assert!(catalog.get("fallback-tom-holland").is_some());
        assert!(catalog.get("tvmaze-1").is_none());
    }

    #[test]
    fn corrupt_catalog_degrades_to_empty() {
        assert!(parse_catalog("{not json").is_empty());
        assert!(FallbackCatalog::from_actors(parse_catalog("[]")).matching("").is_empty());
    }
}
