use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::model::WikiSummary;
use crate::providers::http::JsonFetcher;

const SOURCE: &str = "wikipedia";
const SUMMARY_LANGS: &[&str] = &["en", "pl"];
const MAX_IMAGES: usize = 5;
const PAGE_IMAGE_CANDIDATES: usize = 8;
const COMMONS_CANDIDATES: usize = 5;

/// Best-effort Wikipedia / Commons lookups used to enrich TVMaze records.
///
/// Every public method swallows failures and returns `None` / empty.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    fetcher: JsonFetcher,
    /// `{lang}` is replaced by the wiki language code.
    wiki_host: String,
    commons_host: String,
}

#[derive(Debug, Deserialize, Default)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize, Default)]
struct QueryBody {
    #[serde(default)]
    pages: HashMap<String, QueryPage>,
    #[serde(default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize, Default)]
struct QueryPage {
    #[serde(default)]
    images: Vec<TitleOnly>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct TitleOnly {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(default)]
    url: Option<String>,
}

impl WikipediaClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_hosts(
            "https://{lang}.wikipedia.org",
            "https://commons.wikimedia.org",
        )
    }

    pub fn with_hosts(wiki_host: &str, commons_host: &str) -> anyhow::Result<Self> {
        let settings = ProviderSettings {
            base_url: String::new(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
            backoff_ms: 0,
            ..ProviderSettings::tvmaze_defaults()
        };
        Ok(Self {
            fetcher: JsonFetcher::new(SOURCE, settings)?,
            wiki_host: wiki_host.trim_end_matches('/').to_string(),
            commons_host: commons_host.trim_end_matches('/').to_string(),
        })
    }

    fn wiki_base(&self, lang: &str) -> String {
        self.wiki_host.replace("{lang}", lang)
    }

    /// Page summary (English first, then Polish) plus extra images.
    pub async fn person_summary(&self, name: &str) -> Option<WikiSummary> {
        let title = name.trim();
        if title.is_empty() {
            return None;
        }
        for lang in SUMMARY_LANGS {
            let url = format!(
                "{}/api/rest_v1/page/summary/{}",
                self.wiki_base(lang),
                urlencoding::encode(&title.replace(' ', "_"))
            );
            match self.fetcher.get_json_opt::<WikiSummary, _>(|c| c.get(&url)).await {
                Ok(Some(mut summary)) => {
                    summary.images = self.person_images(title).await;
                    return Some(summary);
                }
                Ok(None) => debug!(lang, name = title, "no wikipedia page"),
                Err(err) => debug!(lang, name = title, error = %err, "wikipedia summary failed"),
            }
        }
        None
    }

    /// Up to five image URLs: page images first, Commons search to top up.
    pub async fn person_images(&self, name: &str) -> Vec<String> {
        let mut images = self.page_images(name).await;
        if images.len() < MAX_IMAGES {
            images.extend(self.commons_images(name).await);
        }
        crate::normalization::dedup_titles(images, MAX_IMAGES)
    }

    async fn page_images(&self, name: &str) -> Vec<String> {
        let api = format!("{}/w/api.php", self.wiki_base("en"));
        let resp: QueryResponse = match self
            .fetcher
            .get_json(|c| {
                c.get(&api).query(&[
                    ("action", "query"),
                    ("format", "json"),
                    ("origin", "*"),
                    ("prop", "images"),
                    ("titles", name),
                    ("imlimit", "20"),
                ])
            })
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                debug!(name, error = %err, "wikipedia page images failed");
                return Vec::new();
            }
        };
        let titles: Vec<String> = resp
            .query
            .map(|q| q.pages.into_values().flat_map(|p| p.images).map(|i| i.title).collect())
            .unwrap_or_default();
        let candidates: Vec<String> = titles
            .into_iter()
            .filter(|t| is_photo_title(t))
            .take(PAGE_IMAGE_CANDIDATES)
            .collect();
        self.resolve_image_urls(&api, &candidates)
            .await
            .into_iter()
            .filter(|url| is_usable_image_url(url))
            .collect()
    }

    async fn commons_images(&self, name: &str) -> Vec<String> {
        let api = format!("{}/w/api.php", self.commons_host);
        let resp: QueryResponse = match self
            .fetcher
            .get_json(|c| {
                c.get(&api).query(&[
                    ("action", "query"),
                    ("format", "json"),
                    ("origin", "*"),
                    ("list", "search"),
                    ("srsearch", name),
                    ("srnamespace", "6"),
                    ("srlimit", "10"),
                ])
            })
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                debug!(name, error = %err, "commons search failed");
                return Vec::new();
            }
        };
        let candidates: Vec<String> = resp
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.title)
            .filter(|t| has_photo_extension(t))
            .take(COMMONS_CANDIDATES)
            .collect();
        self.resolve_image_urls(&api, &candidates).await
    }

    async fn resolve_image_urls(&self, api: &str, titles: &[String]) -> Vec<String> {
        let lookups = titles.iter().map(|title| async move {
            let resp: QueryResponse = self
                .fetcher
                .get_json(|c| {
                    c.get(api).query(&[
                        ("action", "query"),
                        ("format", "json"),
                        ("origin", "*"),
                        ("prop", "imageinfo"),
                        ("iiprop", "url"),
                        ("titles", title.as_str()),
                    ])
                })
                .await
                .ok()?;
            resp.query?
                .pages
                .into_values()
                .flat_map(|p| p.imageinfo)
                .find_map(|info| info.url)
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }
}

fn has_photo_extension(title: &str) -> bool {
    let lower = title.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png"].iter().any(|ext| lower.contains(ext))
}

/// File titles that are likely portraits rather than site chrome.
fn is_photo_title(title: &str) -> bool {
    let lower = title.to_ascii_lowercase();
    has_photo_extension(title)
        && !["commons-logo", "edit-icon", "wikimedia", "icon"]
            .iter()
            .any(|marker| lower.contains(marker))
}

/// Drops tiny thumbnail renditions.
fn is_usable_image_url(url: &str) -> bool {
    !url.contains("20px") && !url.contains("32px")
}
