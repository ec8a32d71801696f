//! Deduplication id derivation for imported statement rows
//!
//! The id is deterministic over (date string, purpose string, source), so
//! re-importing the same statement line always produces the same id. Rows
//! where date AND purpose are both empty get a random id and are therefore
//! never deduplicated — an accepted limitation of the source data.

use chrono::Utc;
use uuid::Uuid;

use crate::models::ImportSource;

/// Derive the import id for a statement row
pub fn derive_import_id(date: &str, purpose: &str, source: ImportSource) -> String {
    if date.is_empty() && purpose.is_empty() {
        return random_import_id(source);
    }
    sanitize(&format!("{}-{}-{}", date, purpose, source.as_str()))
}

/// Fold everything outside `[A-Za-z0-9_-]` to `-`
///
/// ASCII-strict: umlauts fold to `-` too, keeping ids pure-ASCII.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn random_import_id(source: ImportSource) -> String {
    format!(
        "{}-{}-{}",
        source.as_str(),
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
