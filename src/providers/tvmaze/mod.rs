//! TVMaze: open API, no auth. Primary source.

pub mod client;
pub mod normalize;

use serde::{Deserialize, Serialize};

use crate::model::WikiSummary;

pub use client::TvMazeClient;
pub use normalize::TvMazeNormalizer;

pub const SOURCE: &str = "tvmaze";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazePerson {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub country: Option<TvMazeCountry>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<TvMazeImage>,
    #[serde(default)]
    pub url: Option<String>,
    /// Filled by enrichment, never by TVMaze itself.
    #[serde(skip)]
    pub wiki: Option<WikiSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeCountry {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeImage {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeCastCredit {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<CastEmbedded>,
}

impl TvMazeCastCredit {
    pub fn show(&self) -> Option<&TvMazeShow> {
        self.embedded.as_ref()?.show.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastEmbedded {
    #[serde(default)]
    pub show: Option<TvMazeShow>,
    #[serde(default)]
    pub character: Option<TvMazeCharacter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeShow {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub ended: Option<String>,
    #[serde(default)]
    pub rating: Option<TvMazeRating>,
}

impl TvMazeShow {
    pub fn rating(&self) -> f64 {
        self.rating.as_ref().and_then(|r| r.average).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeRating {
    #[serde(default)]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvMazeCharacter {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub person: TvMazePerson,
}
