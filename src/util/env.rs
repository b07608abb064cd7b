//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Common bootstrap for CLI binaries:
///   * initialize dotenv/env once
///   * log which optional provider credentials are present
pub fn bootstrap_cli(bin_name: &str) {
    init_env();

    if env_opt("THETVDB_API_KEY").is_some() {
        info!(target = "bootstrap", bin = bin_name, "TheTVDB api key detected");
    } else {
        warn!(
            target = "bootstrap",
            bin = bin_name,
            "THETVDB_API_KEY not set; TheTVDB will report offline"
        );
    }
    if env_opt("TMDB_API_KEY").is_none() {
        info!(
            target = "bootstrap",
            bin = bin_name,
            "TMDB_API_KEY not set; TMDB provider disabled"
        );
    }
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Boolean flag; accepts 1/true/on/yes and 0/false/off/no (case-insensitive).
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).unwrap_or(default),
        Err(_) => default,
    }
}

/// Comma-separated list; `None` when unset or every entry is blank.
pub fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env_opt(key)?;
    let items = split_csv(&raw);
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
