//! The Movie Database: api-key query auth, optional source.

pub mod client;
pub mod normalize;

use serde::{Deserialize, Serialize};

pub use client::TmdbClient;
pub use normalize::TmdbNormalizer;

pub const SOURCE: &str = "tmdb";
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Search/popular hit. Detail fields stay empty until enrichment or a
/// direct `/person/{id}` lookup fills them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbPerson {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub known_for: Vec<TmdbWork>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub also_known_as: Vec<String>,
    #[serde(default)]
    pub external_ids: Option<TmdbExternalIds>,
}

impl TmdbPerson {
    /// Copy detail-only fields from a `/person/{id}` record.
    pub fn merge_details(&mut self, details: TmdbPerson) {
        self.biography = details.biography.or(self.biography.take());
        self.birthday = details.birthday.or(self.birthday.take());
        self.deathday = details.deathday.or(self.deathday.take());
        self.place_of_birth = details.place_of_birth.or(self.place_of_birth.take());
        if !details.also_known_as.is_empty() {
            self.also_known_as = details.also_known_as;
        }
        self.external_ids = details.external_ids.or(self.external_ids.take());
        if self.profile_path.is_none() {
            self.profile_path = details.profile_path;
        }
        if self.known_for_department.is_none() {
            self.known_for_department = details.known_for_department;
        }
    }

    pub fn department(&self) -> &str {
        self.known_for_department.as_deref().unwrap_or("Acting")
    }
}

/// Movie or TV entry, as found in `known_for` and in combined credits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbWork {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl TmdbWork {
    /// Movies carry `title`, TV shows `name`.
    pub fn label(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn rating(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbExternalIds {
    #[serde(default)]
    pub instagram_id: Option<String>,
    #[serde(default)]
    pub twitter_id: Option<String>,
    #[serde(default)]
    pub facebook_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CombinedCredits {
    #[serde(default = "Vec::new")]
    pub cast: Vec<TmdbWork>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn details_fill_search_hit() {
        let mut hit: TmdbPerson = serde_json::from_value(json!({
            "id": 1, "name": "Zendaya", "profile_path": "/z.jpg", "popularity": 61.2,
            "known_for": [{"title": "Dune", "media_type": "movie", "vote_average": 8.1},
                          {"name": "Euphoria", "media_type": "tv"}]
        }))
        .unwrap();
        assert_eq!(hit.known_for[1].label(), Some("Euphoria"));
        assert_eq!(hit.department(), "Acting");

        let details: TmdbPerson = serde_json::from_value(json!({
            "id": 1, "name": "Zendaya", "birthday": "1996-09-01",
            "place_of_birth": "Oakland, California, USA", "biography": "Bio.",
            "also_known_as": ["Zendaya Coleman"],
            "external_ids": {"instagram_id": "zendaya", "twitter_id": null}
        }))
        .unwrap();
        hit.merge_details(details);
        assert_eq!(hit.birthday.as_deref(), Some("1996-09-01"));
        assert_eq!(hit.profile_path.as_deref(), Some("/z.jpg"));
        assert_eq!(hit.known_for.len(), 2);
        assert_eq!(
            hit.external_ids.unwrap().instagram_id.as_deref(),
            Some("zendaya")
        );
    }
}
