use chrono::{Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Inclusive bounds for an estimated age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Parse `YYYY-MM-DD` (optionally followed by a time part) or a bare year.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date);
    }
    if trimmed.len() == 4 {
        let year: i32 = trimmed.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age estimate derived from `seed_key`, stable for the same key.
pub fn estimate_age(seed_key: &str, range: AgeRange) -> u32 {
    let digest = Sha256::digest(seed_key.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed));
    let (lo, hi) = (range.min.max(1), range.max.max(range.min.max(1)));
    rng.gen_range(lo..=hi)
}

/// Real age when the birth date is usable, otherwise a seeded estimate.
pub fn resolve_age(birth: Option<&str>, seed_key: &str, range: AgeRange) -> u32 {
    resolve_age_on(birth, seed_key, range, Utc::now().date_naive())
}

pub fn resolve_age_on(
    birth: Option<&str>,
    seed_key: &str,
    range: AgeRange,
    today: NaiveDate,
) -> u32 {
    birth
        .and_then(parse_birth_date)
        .map(|date| age_on(date, today))
        .filter(|age| *age > 0)
        .map(|age| age as u32)
        .unwrap_or_else(|| estimate_age(seed_key, range))
}
