//! Deterministic fill-in rules shared by every provider normalizer.

pub mod age;
pub mod buckets;
pub mod lists;

pub use age::{resolve_age, AgeRange};
pub use buckets::BucketScale;
pub use lists::{dedup_titles, pad_to_minimum, truncate_with_ellipsis};
