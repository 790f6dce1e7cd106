//! Utility functions and helpers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Hex digits of randomness appended to every endpoint name.
const NAME_ENTROPY_HEX: usize = 6;

/// Generate a fresh endpoint name: `<prefix>-<unix millis>-<random hex>`.
///
/// The random tail keeps two creates inside the same millisecond apart.
pub fn generate_endpoint_name(prefix: &str) -> String {
    format_endpoint_name(prefix, Utc::now(), Uuid::new_v4())
}

/// Deterministic part of `generate_endpoint_name`.
pub fn format_endpoint_name(prefix: &str, at: DateTime<Utc>, entropy: Uuid) -> String {
    let simple = entropy.simple().to_string();
    format!(
        "{}-{}-{}",
        prefix,
        at.timestamp_millis(),
        &simple[simple.len() - NAME_ENTROPY_HEX..]
    )
}
