//! Per-kind desired rows and their persistence bindings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::models::resource::{NowEntryRow, PostRow, ProjectRow, UseRow};

use super::sync::{DesiredRow, ExistingRow, PersistRow};

macro_rules! impl_existing_row {
    ($row:ty) => {
        impl ExistingRow for $row {
            fn id(&self) -> i64 {
                self.id
            }
            fn slug(&self) -> &str {
                &self.slug
            }
            fn version(&self) -> i32 {
                self.version
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
        }
    };
}

impl_existing_row!(UseRow);
impl_existing_row!(ProjectRow);
impl_existing_row!(PostRow);
impl_existing_row!(NowEntryRow);

#[derive(Debug, Clone)]
pub struct DesiredUse {
    pub slug: String,
    pub title: String,
    pub payload: Value,
    pub updated_at: DateTime<Utc>,
}

impl DesiredRow for DesiredUse {
    type Existing = UseRow;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches(&self, existing: &UseRow) -> bool {
        existing.title == self.title && existing.payload == self.payload
    }
}

#[async_trait]
impl PersistRow for DesiredUse {
    const TABLE: &'static str = "uses";

    async fn fetch_existing(pool: &PgPool) -> Result<Vec<UseRow>, sqlx::Error> {
        sqlx::query_as("SELECT id, slug, title, payload, version, is_active FROM uses")
            .fetch_all(pool)
            .await
    }

    async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO uses (slug, title, payload, is_active, version, updated_at)
            VALUES ($1, $2, $3, TRUE, 1, $4)
            "#,
        )
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.payload)
        .bind(self.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn update(&self, pool: &PgPool, id: i64, next_version: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE uses
            SET title = $1, payload = $2, is_active = TRUE, version = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&self.title)
        .bind(&self.payload)
        .bind(next_version)
        .bind(self.updated_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DesiredNowEntry {
    pub slug: String,
    pub label: String,
    pub text: String,
    pub href: Option<String>,
    pub sort_order: i32,
    pub payload: Value,
    pub updated_at: DateTime<Utc>,
}

impl DesiredRow for DesiredNowEntry {
    type Existing = NowEntryRow;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches(&self, existing: &NowEntryRow) -> bool {
        existing.label == self.label
            && existing.text == self.text
            && existing.href == self.href
            && existing.sort_order == self.sort_order
            && existing.payload == self.payload
    }
}

#[async_trait]
impl PersistRow for DesiredNowEntry {
    const TABLE: &'static str = "now_entries";

    async fn fetch_existing(pool: &PgPool) -> Result<Vec<NowEntryRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, slug, label, text, href, sort_order, payload, version, is_active
            FROM now_entries
            "#,
        )
        .fetch_all(pool)
        .await
    }

    async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO now_entries
                (slug, label, text, href, sort_order, payload, is_active, version, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, 1, $7)
            "#,
        )
        .bind(&self.slug)
        .bind(&self.label)
        .bind(&self.text)
        .bind(&self.href)
        .bind(self.sort_order)
        .bind(&self.payload)
        .bind(self.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn update(&self, pool: &PgPool, id: i64, next_version: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE now_entries
            SET label = $1, text = $2, href = $3, sort_order = $4, payload = $5,
                is_active = TRUE, version = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&self.label)
        .bind(&self.text)
        .bind(&self.href)
        .bind(self.sort_order)
        .bind(&self.payload)
        .bind(next_version)
        .bind(self.updated_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DesiredProject {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub href: Option<String>,
    pub payload: Value,
    pub updated_at: DateTime<Utc>,
}

impl DesiredRow for DesiredProject {
    type Existing = ProjectRow;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches(&self, existing: &ProjectRow) -> bool {
        existing.title == self.title
            && existing.summary == self.summary
            && existing.href == self.href
            && existing.payload == self.payload
    }
}

#[async_trait]
impl PersistRow for DesiredProject {
    const TABLE: &'static str = "projects";

    async fn fetch_existing(pool: &PgPool) -> Result<Vec<ProjectRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, slug, title, summary, href, payload, version, is_active
            FROM projects
            "#,
        )
        .fetch_all(pool)
        .await
    }

    async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO projects (slug, title, summary, href, payload, is_active, version, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, 1, $6)
            "#,
        )
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.summary)
        .bind(&self.href)
        .bind(&self.payload)
        .bind(self.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn update(&self, pool: &PgPool, id: i64, next_version: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE projects
            SET title = $1, summary = $2, href = $3, payload = $4,
                is_active = TRUE, version = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&self.title)
        .bind(&self.summary)
        .bind(&self.href)
        .bind(&self.payload)
        .bind(next_version)
        .bind(self.updated_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DesiredPost {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub published_at: DateTime<Utc>,
    pub updated_at_source: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub featured: bool,
    pub tags: Vec<String>,
    pub reading_time_text: Option<String>,
    pub reading_time_minutes: Option<f32>,
    pub payload: Value,
    pub updated_at: DateTime<Utc>,
}

impl DesiredPost {
    fn tags_json(&self) -> Value {
        Value::from(self.tags.clone())
    }
}

impl DesiredRow for DesiredPost {
    type Existing = PostRow;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn matches(&self, existing: &PostRow) -> bool {
        existing.title == self.title
            && existing.summary == self.summary
            && existing.body_markdown == self.body_markdown
            && existing.published_at == self.published_at
            && existing.updated_at_source == self.updated_at_source
            && existing.author == self.author
            && existing.featured == self.featured
            && existing.tags == self.tags_json()
            && existing.reading_time_text == self.reading_time_text
            && existing.reading_time_minutes == self.reading_time_minutes
            && existing.payload == self.payload
    }
}

#[async_trait]
impl PersistRow for DesiredPost {
    const TABLE: &'static str = "posts";

    async fn fetch_existing(pool: &PgPool) -> Result<Vec<PostRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, slug, title, summary, body_markdown, published_at, updated_at_source,
                   author, featured, tags, reading_time_text, reading_time_minutes, payload,
                   version, is_active
            FROM posts
            "#,
        )
        .fetch_all(pool)
        .await
    }

    async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO posts
                (slug, title, summary, body_markdown, published_at, updated_at_source, author,
                 featured, tags, reading_time_text, reading_time_minutes, payload,
                 is_active, version, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, 1, $13)
            "#,
        )
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.summary)
        .bind(&self.body_markdown)
        .bind(self.published_at)
        .bind(self.updated_at_source)
        .bind(&self.author)
        .bind(self.featured)
        .bind(self.tags_json())
        .bind(&self.reading_time_text)
        .bind(self.reading_time_minutes)
        .bind(&self.payload)
        .bind(self.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn update(&self, pool: &PgPool, id: i64, next_version: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, summary = $2, body_markdown = $3, published_at = $4,
                updated_at_source = $5, author = $6, featured = $7, tags = $8,
                reading_time_text = $9, reading_time_minutes = $10, payload = $11,
                is_active = TRUE, version = $12, updated_at = $13
            WHERE id = $14
            "#,
        )
        .bind(&self.title)
        .bind(&self.summary)
        .bind(&self.body_markdown)
        .bind(self.published_at)
        .bind(self.updated_at_source)
        .bind(&self.author)
        .bind(self.featured)
        .bind(self.tags_json())
        .bind(&self.reading_time_text)
        .bind(self.reading_time_minutes)
        .bind(&self.payload)
        .bind(next_version)
        .bind(self.updated_at)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desired_project() -> DesiredProject {
        DesiredProject {
            slug: "active-projects-one".to_string(),
            title: "One".to_string(),
            summary: "First.".to_string(),
            href: None,
            payload: json!({ "track": "core" }),
            updated_at: "2026-02-22T00:00:00Z".parse().unwrap(),
        }
    }

    fn existing_project() -> ProjectRow {
        ProjectRow {
            id: 1,
            slug: "active-projects-one".to_string(),
            title: "One".to_string(),
            summary: "First.".to_string(),
            href: None,
            payload: json!({ "track": "core" }),
            version: 1,
            is_active: true,
        }
    }

    #[test]
    fn project_matches_on_deep_payload_equality() {
        let desired = desired_project();
        let mut existing = existing_project();
        assert!(desired.matches(&existing));

        existing.payload = json!({ "track": "experiments" });
        assert!(!desired.matches(&existing));
    }

    #[test]
    fn project_single_field_change_breaks_match() {
        let desired = desired_project();
        let mut existing = existing_project();
        existing.summary = "Changed.".to_string();
        assert!(!desired.matches(&existing));
    }

    #[test]
    fn post_matches_compare_tags_structurally() {
        let desired = DesiredPost {
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            summary: "S".to_string(),
            body_markdown: "# Hello".to_string(),
            published_at: "2026-02-20T00:00:00Z".parse().unwrap(),
            updated_at_source: None,
            author: None,
            featured: false,
            tags: vec!["a".to_string(), "b".to_string()],
            reading_time_text: Some("1 min read".to_string()),
            reading_time_minutes: Some(1.0),
            payload: json!({}),
            updated_at: "2026-02-24T00:00:00Z".parse().unwrap(),
        };

        let mut existing = PostRow {
            id: 1,
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            summary: "S".to_string(),
            body_markdown: "# Hello".to_string(),
            published_at: "2026-02-20T00:00:00Z".parse().unwrap(),
            updated_at_source: None,
            author: None,
            featured: false,
            tags: json!(["a", "b"]),
            reading_time_text: Some("1 min read".to_string()),
            reading_time_minutes: Some(1.0),
            payload: json!({}),
            version: 1,
            is_active: true,
        };
        assert!(desired.matches(&existing));

        // Tag order is significant.
        existing.tags = json!(["b", "a"]);
        assert!(!desired.matches(&existing));
    }
}
