use axum::{
    extract::{Path, Query, State},
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
struct PostListRecord {
    id: i64,
    slug: String,
    title: String,
    summary: String,
    published_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    featured: bool,
    tags: Value,
    reading_time_text: Option<String>,
    reading_time_minutes: Option<f32>,
}

/// List projection deliberately excludes the markdown body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub published_at: String,
    pub updated_at: String,
    pub featured: bool,
    pub tags: Value,
    pub reading_time_text: Option<String>,
    pub reading_time_minutes: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct PostsListResponse {
    pub data: Vec<PostListItem>,
    pub page: PageInfo,
}

#[derive(Debug, FromRow)]
struct PostDetailRecord {
    slug: String,
    title: String,
    summary: String,
    body_markdown: String,
    published_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    updated_at_source: Option<DateTime<Utc>>,
    author: Option<String>,
    featured: bool,
    tags: Value,
    reading_time_text: Option<String>,
    reading_time_minutes: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub published_at: String,
    pub updated_at: String,
    pub updated_at_source: Option<String>,
    pub author: Option<String>,
    pub featured: bool,
    pub tags: Value,
    pub reading_time_text: Option<String>,
    pub reading_time_minutes: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub data: PostDetail,
}

/// GET /v1/posts
/// Keyset-paginated over `(published_at DESC, id DESC)`.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostsListResponse>, AppError> {
    let page = resolve_page_request(&query)?;

    let records: Vec<PostListRecord> = match page.cursor {
        Some(cursor) => {
            sqlx::query_as(
                r#"
                SELECT id, slug, title, summary, published_at, updated_at, featured, tags,
                       reading_time_text, reading_time_minutes
                FROM posts
                WHERE is_active = TRUE
                  AND (published_at < $1 OR (published_at = $1 AND id < $2))
                ORDER BY published_at DESC, id DESC
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
                SELECT id, slug, title, summary, published_at, updated_at, featured, tags,
                       reading_time_text, reading_time_minutes
                FROM posts
                WHERE is_active = TRUE
                ORDER BY published_at DESC, id DESC
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
                updated_at: record.published_at,
                id: record.id,
            })
        })
    } else {
        None
    };

    let data = page_records
        .iter()
        .map(|record| PostListItem {
            slug: record.slug.clone(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            published_at: to_iso_string(record.published_at),
            updated_at: to_iso_string(record.updated_at),
            featured: record.featured,
            tags: record.tags.clone(),
            reading_time_text: record.reading_time_text.clone(),
            reading_time_minutes: record.reading_time_minutes,
        })
        .collect();

    Ok(Json(PostsListResponse {
        data,
        page: PageInfo {
            next_cursor,
            has_more,
            as_of: to_iso_string(Utc::now()),
        },
    }))
}

/// GET /v1/posts/:slug
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>, AppError> {
    let record: Option<PostDetailRecord> = sqlx::query_as(
        r#"
        SELECT slug, title, summary, body_markdown, published_at, updated_at,
               updated_at_source, author, featured, tags, reading_time_text,
               reading_time_minutes
        FROM posts
        WHERE slug = $1 AND is_active = TRUE
        LIMIT 1
        "#,
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?;

    let record = record.ok_or_else(|| AppError::NotFound("not_found".to_string()))?;

    Ok(Json(PostDetailResponse {
        data: PostDetail {
            slug: record.slug,
            title: record.title,
            summary: record.summary,
            body_markdown: record.body_markdown,
            published_at: to_iso_string(record.published_at),
            updated_at: to_iso_string(record.updated_at),
            updated_at_source: record.updated_at_source.map(to_iso_string),
            author: record.author,
            featured: record.featured,
            tags: record.tags,
            reading_time_text: record.reading_time_text,
            reading_time_minutes: record.reading_time_minutes,
        },
    }))
}
