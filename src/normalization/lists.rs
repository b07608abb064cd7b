use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Trim, drop blanks, dedupe in first-seen order, cap at `limit`.
pub fn dedup_titles<I, S>(titles: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter_map(|t| {
            let t = t.as_ref().trim();
            (!t.is_empty()).then(|| t.to_string())
        })
        .filter(|t| seen.insert(t.clone()))
        .take(limit)
        .collect()
}

/// Append random, not-yet-present entries from `pool` until `items` holds
/// `min` entries, then truncate to `min`.
///
/// Pool entries are used without repetition first; if the pool runs dry the
/// remaining slots reuse pool entries so the minimum always holds.
pub fn pad_to_minimum<R: Rng + ?Sized>(
    mut items: Vec<String>,
    pool: &[&str],
    min: usize,
    rng: &mut R,
) -> Vec<String> {
    if items.len() < min && !pool.is_empty() {
        let mut fresh: Vec<&str> = pool
            .iter()
            .copied()
            .filter(|p| !items.iter().any(|i| i == p))
            .collect();
        fresh.shuffle(rng);
        let mut fresh = fresh.into_iter();
        while items.len() < min {
            let next = match fresh.next() {
                Some(entry) => entry,
                None => pool[rng.gen_range(0..pool.len())],
            };
            items.push(next.to_string());
        }
    }
    if min > 0 {
        items.truncate(min);
    }
    items
}

/// First `max_chars` characters followed by `...` when the text was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &trimmed[..byte_idx]),
        None => trimmed.to_string(),
    }
}

/// Text up to and including the first full stop.
pub fn first_sentence(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let sentence = trimmed.split('.').next().unwrap_or(trimmed).trim();
    if sentence.is_empty() {
        None
    } else {
        Some(format!("{sentence}."))
    }
}

pub fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
