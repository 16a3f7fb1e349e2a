//! The content snapshot: the full desired state for one import run. Produced
//! externally (a JSON export of the site repository's content modules); the
//! reconciler depends only on this shape, not on how it was built.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    pub uses: UsesGroup,
    #[serde(default)]
    pub now: NowGroup,
    #[serde(default)]
    pub projects: ProjectsGroup,
    #[serde(default)]
    pub posts: PostsGroup,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsesGroup {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sections: Vec<UseSectionSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UseSectionSnapshot {
    pub title: String,
    pub items: Vec<UseItemSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseItemSnapshot {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowGroup {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub entries: Vec<NowEntrySnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NowEntrySnapshot {
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsGroup {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<ProjectSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSource {
    ActiveProjects,
    AiProjects,
}

impl ProjectSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectSource::ActiveProjects => "active_projects",
            ProjectSource::AiProjects => "ai_projects",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub source_group: ProjectSource,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsGroup {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<PostSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSnapshot {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body_markdown: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at_source: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reading_time_text: Option<String>,
    #[serde(default)]
    pub reading_time_minutes: Option<f32>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// Loads and validates a snapshot file. A malformed snapshot is a hard
/// failure surfaced before any reconciliation begins.
pub fn load_snapshot(path: &Path) -> Result<ContentSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid content snapshot", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_snapshot() {
        let snapshot: ContentSnapshot = serde_json::from_value(serde_json::json!({
            "uses": {
                "lastUpdated": "2026-02-20T00:00:00.000Z",
                "sections": [
                    { "title": "Dev stack", "items": [{ "label": "Editor", "value": "Helix" }] }
                ]
            },
            "now": {
                "lastUpdated": "2026-02-21T00:00:00.000Z",
                "narrative": "Ship and learn.",
                "entries": [{ "label": "Focus", "text": "API endpoints." }]
            },
            "projects": {
                "lastUpdated": "2026-02-22T00:00:00.000Z",
                "items": [{
                    "sourceGroup": "active_projects",
                    "title": "Project One",
                    "summary": "Primary project.",
                    "href": "https://example.com",
                    "payload": { "track": "core" }
                }]
            },
            "posts": {
                "lastUpdated": "2026-02-24T00:00:00.000Z",
                "items": [{
                    "slug": "building-with-agents",
                    "title": "Building with agents",
                    "summary": "Lessons.",
                    "bodyMarkdown": "# Hi",
                    "publishedAt": "2026-02-20T00:00:00.000Z",
                    "featured": true,
                    "tags": ["agents"],
                    "readingTimeText": "1 min read",
                    "readingTimeMinutes": 1.0
                }]
            }
        }))
        .unwrap();

        assert_eq!(snapshot.uses.sections.len(), 1);
        assert_eq!(snapshot.now.entries[0].href, None);
        assert_eq!(
            snapshot.projects.items[0].source_group,
            ProjectSource::ActiveProjects
        );
        assert_eq!(snapshot.posts.items[0].tags, vec!["agents".to_string()]);
        assert_eq!(snapshot.posts.items[0].updated_at_source, None);
    }

    #[test]
    fn missing_groups_default_to_empty() {
        let snapshot: ContentSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.uses.last_updated.is_none());
        assert!(snapshot.uses.sections.is_empty());
        assert!(snapshot.now.narrative.is_empty());
        assert!(snapshot.posts.items.is_empty());
    }

    #[test]
    fn rejects_unknown_source_groups() {
        let result: Result<ProjectSnapshot, _> = serde_json::from_value(serde_json::json!({
            "sourceGroup": "archived_projects",
            "title": "X",
            "summary": "Y"
        }));
        assert!(result.is_err());
    }
}
