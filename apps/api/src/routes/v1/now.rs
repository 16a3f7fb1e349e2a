use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::errors::AppError;
use crate::meta_values::{extract_string_meta_value, fetch_meta_value, to_iso_string};
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct ActiveNowEntry {
    slug: String,
    label: String,
    text: String,
    href: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NowItem {
    pub slug: String,
    pub label: String,
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowSnapshot {
    pub updated_at: Option<String>,
    pub narrative: Option<String>,
    pub items: Vec<NowItem>,
}

#[derive(Debug, Serialize)]
pub struct NowResponse {
    pub data: NowSnapshot,
}

/// GET /v1/now
pub async fn get_now(State(state): State<AppState>) -> Result<Json<NowResponse>, AppError> {
    let entries: Vec<ActiveNowEntry> = sqlx::query_as(
        r#"
        SELECT slug, label, text, href, updated_at
        FROM now_entries
        WHERE is_active = TRUE
        ORDER BY sort_order ASC, updated_at DESC, id DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let narrative_value = fetch_meta_value(&state.db, "now_narrative").await?;
    let last_updated_value = fetch_meta_value(&state.db, "now_last_updated").await?;

    // The meta key is authoritative; fall back to the newest entry timestamp.
    let fallback_last_updated = entries.iter().map(|entry| entry.updated_at).max();
    let updated_at = extract_string_meta_value(last_updated_value.as_ref())
        .or_else(|| fallback_last_updated.map(to_iso_string));

    let items = entries
        .into_iter()
        .map(|entry| NowItem {
            slug: entry.slug,
            label: entry.label,
            text: entry.text,
            href: entry.href,
        })
        .collect();

    Ok(Json(NowResponse {
        data: NowSnapshot {
            updated_at,
            narrative: extract_string_meta_value(narrative_value.as_ref()),
            items,
        },
    }))
}
