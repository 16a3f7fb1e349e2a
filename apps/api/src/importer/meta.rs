//! Insert/update/unchanged reconciliation for the flat meta key-value table.
//! No soft delete here; rows are only ever inserted or overwritten.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::meta::MetaRow;

use super::sync::ImportMode;

#[derive(Debug, Clone)]
pub struct MetaEntry {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetaSummary {
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
}

/// A stored row needs rewriting when the value differs structurally or the
/// timestamp differs at millisecond precision.
pub fn meta_entry_changed(
    existing_value: &Value,
    existing_updated_at: DateTime<Utc>,
    entry: &MetaEntry,
) -> bool {
    existing_value != &entry.value
        || existing_updated_at.timestamp_millis() != entry.updated_at.timestamp_millis()
}

pub async fn sync_meta(
    pool: &PgPool,
    mode: ImportMode,
    entries: &[MetaEntry],
) -> Result<MetaSummary, sqlx::Error> {
    let mut summary = MetaSummary::default();

    let keys: Vec<String> = entries.iter().map(|entry| entry.key.clone()).collect();

    let existing_rows: Vec<MetaRow> = if keys.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as("SELECT key, value, updated_at FROM meta WHERE key = ANY($1)")
            .bind(&keys)
            .fetch_all(pool)
            .await?
    };

    let existing_by_key: HashMap<&str, &MetaRow> = existing_rows
        .iter()
        .map(|existing| (existing.key.as_str(), existing))
        .collect();

    for entry in entries {
        let Some(existing) = existing_by_key.get(entry.key.as_str()) else {
            summary.inserted += 1;
            if mode == ImportMode::Apply {
                sqlx::query("INSERT INTO meta (key, value, updated_at) VALUES ($1, $2, $3)")
                    .bind(&entry.key)
                    .bind(&entry.value)
                    .bind(entry.updated_at)
                    .execute(pool)
                    .await?;
            }
            continue;
        };

        if !meta_entry_changed(&existing.value, existing.updated_at, entry) {
            summary.unchanged += 1;
            continue;
        }

        summary.updated += 1;
        if mode == ImportMode::Apply {
            sqlx::query("UPDATE meta SET value = $1, updated_at = $2 WHERE key = $3")
                .bind(&entry.value)
                .bind(entry.updated_at)
                .bind(&entry.key)
                .execute(pool)
                .await?;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value, updated_at: &str) -> MetaEntry {
        MetaEntry {
            key: "uses_last_updated".to_string(),
            value,
            updated_at: updated_at.parse().unwrap(),
        }
    }

    #[test]
    fn identical_value_and_timestamp_is_unchanged() {
        let stored: DateTime<Utc> = "2026-02-20T00:00:00Z".parse().unwrap();
        let entry = entry(json!("2026-02-20T00:00:00.000Z"), "2026-02-20T00:00:00Z");
        assert!(!meta_entry_changed(
            &json!("2026-02-20T00:00:00.000Z"),
            stored,
            &entry
        ));
    }

    #[test]
    fn value_difference_forces_update() {
        let stored: DateTime<Utc> = "2026-02-20T00:00:00Z".parse().unwrap();
        let entry = entry(json!("new narrative"), "2026-02-20T00:00:00Z");
        assert!(meta_entry_changed(&json!("old narrative"), stored, &entry));
    }

    #[test]
    fn timestamps_compare_at_millisecond_precision() {
        let entry = entry(json!("same"), "2026-02-20T00:00:00.001Z");

        let same_millisecond: DateTime<Utc> = "2026-02-20T00:00:00.001Z".parse().unwrap();
        assert!(!meta_entry_changed(&json!("same"), same_millisecond, &entry));

        let different_millisecond: DateTime<Utc> = "2026-02-20T00:00:00.002Z".parse().unwrap();
        assert!(meta_entry_changed(
            &json!("same"),
            different_millisecond,
            &entry
        ));
    }

    #[test]
    fn deep_structural_comparison_over_object_values() {
        let stored: DateTime<Utc> = "2026-02-20T00:00:00Z".parse().unwrap();
        let entry = entry(json!({ "value": "a", "n": 1 }), "2026-02-20T00:00:00Z");

        assert!(!meta_entry_changed(
            &json!({ "n": 1, "value": "a" }),
            stored,
            &entry
        ));
        assert!(meta_entry_changed(
            &json!({ "n": 2, "value": "a" }),
            stored,
            &entry
        ));
    }
}
