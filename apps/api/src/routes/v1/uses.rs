use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::errors::AppError;
use crate::meta_values::{extract_string_meta_value, fetch_meta_value, to_iso_string};
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct ActiveUseSection {
    slug: String,
    title: String,
    payload: Value,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UseSectionItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct UseSection {
    pub slug: String,
    pub title: String,
    pub items: Vec<UseSectionItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsesSnapshot {
    pub updated_at: Option<String>,
    pub sections: Vec<UseSection>,
}

#[derive(Debug, Serialize)]
pub struct UsesResponse {
    pub data: UsesSnapshot,
}

/// Re-extracts section items from the stored payload, dropping anything that
/// no longer has the expected `{label, value}` string shape.
fn extract_use_items(payload: &Value) -> Vec<UseSectionItem> {
    let Some(raw_items) = payload.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    raw_items
        .iter()
        .filter_map(|raw_item| {
            let label = raw_item.get("label")?.as_str()?;
            let value = raw_item.get("value")?.as_str()?;
            Some(UseSectionItem {
                label: label.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// GET /v1/uses
pub async fn get_uses(State(state): State<AppState>) -> Result<Json<UsesResponse>, AppError> {
    let sections: Vec<ActiveUseSection> = sqlx::query_as(
        r#"
        SELECT slug, title, payload, updated_at
        FROM uses
        WHERE is_active = TRUE
        ORDER BY updated_at DESC, id DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let last_updated_value = fetch_meta_value(&state.db, "uses_last_updated").await?;
    let fallback_last_updated = sections.first().map(|section| section.updated_at);
    let updated_at = extract_string_meta_value(last_updated_value.as_ref())
        .or_else(|| fallback_last_updated.map(to_iso_string));

    let sections = sections
        .into_iter()
        .map(|section| UseSection {
            slug: section.slug,
            title: section.title,
            items: extract_use_items(&section.payload),
        })
        .collect();

    Ok(Json(UsesResponse {
        data: UsesSnapshot {
            updated_at,
            sections,
        },
    }))
}
