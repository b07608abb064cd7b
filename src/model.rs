use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical person record every provider normalizes into.
///
/// List fields are always present (possibly empty) and `image` always holds
/// some URL, so the rendering layer never has to branch on missing data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// `"<source>-<providerId>"`, unique across sources.
    pub id: String,
    pub name: String,
    pub age: u32,
    pub birth_place: String,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub filmography: Vec<String>,
    #[serde(default)]
    pub music: Vec<String>,
    #[serde(default)]
    pub books: Vec<String>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub trivia: Vec<String>,
    #[serde(default)]
    pub fun_facts: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<String>,
    pub net_worth: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub social_media: Vec<String>,
    #[serde(default)]
    pub upcoming_projects: Vec<String>,
    #[serde(default)]
    pub controversies: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_data: Option<WikiSummary>,
    #[serde(default, rename = "sourceData", skip_serializing_if = "Option::is_none")]
    pub source_payload: Option<Value>,
}

impl Actor {
    /// Source tag encoded in the id prefix (`tvmaze`, `tvdb`, ...).
    pub fn source(&self) -> &str {
        self.id.split_once('-').map(|(tag, _)| tag).unwrap_or("")
    }

    pub fn name_matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.name.to_lowercase().contains(needle_lower)
    }
}

/// Builds the namespaced id for a provider record.
pub fn namespaced_id(source: &str, provider_id: impl std::fmt::Display) -> String {
    format!("{source}-{provider_id}")
}

/// Wikipedia page summary kept on enriched records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WikiSummary {
    pub title: String,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<WikiImage>,
    #[serde(default)]
    pub originalimage: Option<WikiImage>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WikiImage {
    pub source: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Per-provider availability, in provider-priority order.
pub type StatusMap = IndexMap<String, ProviderStatus>;

/// Result of one aggregation round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregation {
    pub actors: Vec<Actor>,
    pub status: StatusMap,
}

impl Aggregation {
    /// `online` if any provider answered, `offline` if all failed, else `unknown`.
    pub fn overall_status(&self) -> ProviderStatus {
        if self.status.values().any(|s| *s == ProviderStatus::Online) {
            ProviderStatus::Online
        } else if !self.status.is_empty()
            && self.status.values().all(|s| *s == ProviderStatus::Offline)
        {
            ProviderStatus::Offline
        } else {
            ProviderStatus::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_comes_from_id_prefix() {
        let actor = Actor {
            id: namespaced_id("tvmaze", 42),
            ..Actor::default()
        };
        assert_eq!(actor.id, "tvmaze-42");
        assert_eq!(actor.source(), "tvmaze");
    }

    #[test]
    fn serializes_camel_case_and_lowercase_status() {
        let actor = Actor {
            id: "tvdb-1".into(),
            name: "X".into(),
            age: 30,
            birth_place: "Y".into(),
            image: "https://img".into(),
            net_worth: "$1M".into(),
            ..Actor::default()
        };
        let json = serde_json::to_value(&actor).unwrap();
        assert!(json.get("birthPlace").is_some());
        assert!(json.get("funFacts").unwrap().as_array().unwrap().is_empty());
        assert!(json.get("wikiData").is_none());

        let status = serde_json::to_value(ProviderStatus::Offline).unwrap();
        assert_eq!(status, serde_json::json!("offline"));
    }

    #[test]
    fn overall_status_rules() {
        let mut agg = Aggregation::default();
        assert_eq!(agg.overall_status(), ProviderStatus::Unknown);
        agg.status.insert("a".into(), ProviderStatus::Offline);
        agg.status.insert("b".into(), ProviderStatus::Offline);
        assert_eq!(agg.overall_status(), ProviderStatus::Offline);
        agg.status.insert("b".into(), ProviderStatus::Online);
        assert_eq!(agg.overall_status(), ProviderStatus::Online);
    }
}
