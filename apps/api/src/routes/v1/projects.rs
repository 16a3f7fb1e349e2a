use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::errors::AppError;
use crate::meta_values::to_iso_string;
use crate::pagination::{
    encode_cursor, resolve_page_request, CursorPosition, PageInfo, PaginationQuery,
};
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct ProjectRecord {
    id: i64,
    slug: String,
    title: String,
    summary: String,
    href: Option<String>,
    updated_at: DateTime<Utc>,
    version: i32,
    is_active: bool,
    payload: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub href: Option<String>,
    pub updated_at: String,
    pub version: i32,
    pub is_active: bool,
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct ProjectsListResponse {
    pub data: Vec<ProjectItem>,
    pub page: PageInfo,
}

/// GET /v1/projects
/// Keyset-paginated over `(updated_at DESC, id DESC)`; the import encodes
/// snapshot order into updated_at, so this is also snapshot order.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ProjectsListResponse>, AppError> {
    let page = resolve_page_request(&query)?;

    let records: Vec<ProjectRecord> = match page.cursor {
        Some(cursor) => {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, href, updated_at, version, is_active, payload
                FROM projects
                WHERE is_active = TRUE
                  AND (updated_at < $1 OR (updated_at = $1 AND id < $2))
                ORDER BY updated_at DESC, id DESC
                LIMIT $3
                "#,
            )
            .bind(cursor.updated_at)
            .bind(cursor.id)
            .bind(page.limit + 1)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, href, updated_at, version, is_active, payload
                FROM projects
                WHERE is_active = TRUE
                ORDER BY updated_at DESC, id DESC
                LIMIT $1
                "#,
            )
            .bind(page.limit + 1)
            .fetch_all(&state.db)
            .await?
        }
    };

    let has_more = records.len() as i64 > page.limit;
    let page_records = if has_more {
        &records[..page.limit as usize]
    } else {
        &records[..]
    };

    let next_cursor = if has_more {
        page_records.last().map(|record| {
            encode_cursor(&CursorPosition {
                updated_at: record.updated_at,
                id: record.id,
            })
        })
    } else {
        None
    };

    let data = page_records
        .iter()
        .map(|record| ProjectItem {
            slug: record.slug.clone(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            href: record.href.clone(),
            updated_at: to_iso_string(record.updated_at),
            version: record.version,
            is_active: record.is_active,
            payload: record.payload.clone(),
        })
        .collect();

    Ok(Json(ProjectsListResponse {
        data,
        page: PageInfo {
            next_cursor,
            has_more,
            as_of: to_iso_string(Utc::now()),
        },
    }))
}
