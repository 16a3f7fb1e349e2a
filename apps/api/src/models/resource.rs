//! Existing-row projections used by the bootstrap reconciler. Each carries
//! the full content column set plus the reconciliation bookkeeping columns
//! (slug identity, version counter, soft-delete flag).

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UseRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub payload: Value,
    pub version: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub href: Option<String>,
    pub payload: Value,
    pub version: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub published_at: DateTime<Utc>,
    pub updated_at_source: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub featured: bool,
    pub tags: Value,
    pub reading_time_text: Option<String>,
    pub reading_time_minutes: Option<f32>,
    pub payload: Value,
    pub version: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct NowEntryRow {
    pub id: i64,
    pub slug: String,
    pub label: String,
    pub text: String,
    pub href: Option<String>,
    pub sort_order: i32,
    pub payload: Value,
    pub version: i32,
    pub is_active: bool,
}
