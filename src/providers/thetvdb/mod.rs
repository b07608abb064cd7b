//! TheTVDB v4: bearer-token API, secondary source.

pub mod auth;
pub mod client;
pub mod normalize;

use serde::{Deserialize, Serialize};

pub use client::TvdbClient;
pub use normalize::TvdbNormalizer;

pub const SOURCE: &str = "tvdb";

/// `{ "status": "success", "data": ... }` wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_success(self) -> Option<T> {
        match self.status.as_deref() {
            Some("success") | None => self.data,
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvdbPerson {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default)]
    pub death: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    /// 1 = male, 2 = female.
    #[serde(default)]
    pub gender: Option<u8>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub biographies: Vec<TvdbBiography>,
    #[serde(default)]
    pub aliases: Vec<TvdbAlias>,
    #[serde(default)]
    pub awards: Vec<TvdbAward>,
    #[serde(default)]
    pub characters: Vec<TvdbCredit>,
}

impl TvdbPerson {
    /// Inline biography, else the English entry of `biographies`.
    pub fn biography_text(&self) -> Option<&str> {
        self.biography
            .as_deref()
            .or_else(|| {
                self.biographies
                    .iter()
                    .find(|b| b.language.as_deref() == Some("eng"))
                    .map(|b| b.biography.as_str())
            })
            .filter(|b| !b.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvdbBiography {
    pub biography: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvdbAlias {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvdbAward {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// A character played by the person; the unit of TheTVDB credits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvdbCredit {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub series_id: Option<u64>,
    #[serde(default)]
    pub movie_id: Option<u64>,
    #[serde(default)]
    pub series: Option<TvdbRecordInfo>,
    #[serde(default)]
    pub movie: Option<TvdbRecordInfo>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub people_type: Option<String>,
}

impl TvdbCredit {
    pub fn work_title(&self) -> Option<String> {
        self.series
            .as_ref()
            .or(self.movie.as_ref())
            .and_then(|r| r.name.clone())
            .or_else(|| self.series_id.map(|id| format!("TV Series {id}")))
    }

    /// Identity of the work this credit belongs to.
    pub fn work_key(&self) -> Option<u64> {
        self.series_id.or(self.movie_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvdbRecordInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TvdbSearchResult {
    #[serde(default)]
    pub tvdb_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub translations: Option<std::collections::HashMap<String, String>>,
}

impl TvdbSearchResult {
    /// Search ids look like `"people-290434"`; keep the numeric tail.
    pub fn numeric_id(&self) -> Option<u64> {
        self.tvdb_id
            .as_deref()
            .or(self.id.as_deref())
            .and_then(|raw| raw.rsplit('-').next())
            .and_then(|tail| tail.trim().parse().ok())
    }

    pub fn into_person(self) -> Option<TvdbPerson> {
        let id = self.numeric_id()?;
        let biography = self
            .translations
            .as_ref()
            .and_then(|t| t.get("eng").cloned())
            .or_else(|| Some("Actor known for various TV shows and films.".to_string()));
        Some(TvdbPerson {
            id,
            name: self.name,
            image: self.image_url,
            biography,
            ..TvdbPerson::default()
        })
    }
}
