//! Import orchestrator: drives slug assignment, the four resource
//! reconcilers, and the meta batch for one bootstrap run.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

use crate::meta_values::to_iso_string;

use super::meta::{sync_meta, MetaEntry, MetaSummary};
use super::rows::{DesiredNowEntry, DesiredPost, DesiredProject, DesiredUse};
use super::slug::SlugFactory;
use super::snapshot::{ContentSnapshot, NowGroup, PostsGroup, ProjectsGroup, UsesGroup};
use super::sync::{sync_resource, ImportMode, ResourceSummary};

/// Marker stored in generated payloads so rows can be traced back to the
/// site repository import.
const PAYLOAD_SOURCE: &str = "site_repo";

#[derive(Debug, Clone, Copy)]
pub struct RunImportOptions {
    pub mode: ImportMode,
    /// Fallback timestamp for groups without their own last-updated value.
    /// Defaults to now; injectable for deterministic tests.
    pub execution_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub uses: ResourceSummary,
    pub now_entries: ResourceSummary,
    pub projects: ResourceSummary,
    pub posts: ResourceSummary,
    pub meta: MetaSummary,
}

fn resolve_resource_timestamp(
    resource_timestamp: Option<DateTime<Utc>>,
    fallback_timestamp: DateTime<Utc>,
) -> DateTime<Utc> {
    resource_timestamp.unwrap_or(fallback_timestamp)
}

/// Encodes snapshot order into the timestamp column: the row at `index` is
/// stamped `base - index` milliseconds, so reading back ordered by
/// `(updated_at DESC, id DESC)` recovers snapshot order.
fn with_sort_offset(base_timestamp: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    base_timestamp - Duration::milliseconds(index as i64)
}

fn latest_timestamp(timestamps: &[DateTime<Utc>]) -> Option<DateTime<Utc>> {
    timestamps.iter().copied().max()
}

fn build_desired_uses(group: &UsesGroup, resource_updated_at: DateTime<Utc>) -> Vec<DesiredUse> {
    let mut slug_factory = SlugFactory::new();

    group
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| DesiredUse {
            slug: slug_factory.assign(&format!("uses-{}", section.title), "uses-section"),
            title: section.title.clone(),
            payload: json!({
                "source": PAYLOAD_SOURCE,
                "items": section.items,
            }),
            updated_at: with_sort_offset(resource_updated_at, index),
        })
        .collect()
}

fn build_desired_now_entries(
    group: &NowGroup,
    resource_updated_at: DateTime<Utc>,
) -> Vec<DesiredNowEntry> {
    let mut slug_factory = SlugFactory::new();

    group
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| DesiredNowEntry {
            slug: slug_factory.assign(&format!("now-{}", entry.label), "now-entry"),
            label: entry.label.clone(),
            text: entry.text.clone(),
            href: entry.href.clone(),
            sort_order: index as i32,
            payload: json!({ "source": PAYLOAD_SOURCE }),
            updated_at: with_sort_offset(resource_updated_at, index),
        })
        .collect()
}

fn build_desired_projects(
    group: &ProjectsGroup,
    resource_updated_at: DateTime<Utc>,
) -> Vec<DesiredProject> {
    let mut slug_factory = SlugFactory::new();

    group
        .items
        .iter()
        .enumerate()
        .map(|(index, project)| DesiredProject {
            slug: slug_factory.assign(
                &format!("{}-{}", project.source_group.as_str(), project.title),
                "project-item",
            ),
            title: project.title.clone(),
            summary: project.summary.clone(),
            href: project.href.clone(),
            payload: Value::Object(project.payload.clone()),
            updated_at: with_sort_offset(resource_updated_at, index),
        })
        .collect()
}

fn build_desired_posts(group: &PostsGroup, resource_updated_at: DateTime<Utc>) -> Vec<DesiredPost> {
    let mut slug_factory = SlugFactory::new();

    group
        .items
        .iter()
        .enumerate()
        .map(|(index, post)| DesiredPost {
            // Posts arrive with authored slugs; they still pass through the
            // factory so in-run duplicates get deduplicated suffixes.
            slug: slug_factory.assign(&post.slug, "post-item"),
            title: post.title.clone(),
            summary: post.summary.clone(),
            body_markdown: post.body_markdown.clone(),
            published_at: post.published_at,
            updated_at_source: post.updated_at_source,
            author: post.author.clone(),
            featured: post.featured,
            tags: post.tags.clone(),
            reading_time_text: post.reading_time_text.clone(),
            reading_time_minutes: post.reading_time_minutes,
            payload: Value::Object(post.payload.clone()),
            updated_at: with_sort_offset(resource_updated_at, index),
        })
        .collect()
}

fn build_meta_entries(
    narrative: &str,
    uses_timestamp: DateTime<Utc>,
    now_timestamp: DateTime<Utc>,
    projects_timestamp: DateTime<Utc>,
    posts_timestamp: DateTime<Utc>,
) -> Vec<MetaEntry> {
    let mut entries = vec![
        MetaEntry {
            key: "uses_last_updated".to_string(),
            value: json!(to_iso_string(uses_timestamp)),
            updated_at: uses_timestamp,
        },
        MetaEntry {
            key: "now_last_updated".to_string(),
            value: json!(to_iso_string(now_timestamp)),
            updated_at: now_timestamp,
        },
        MetaEntry {
            key: "projects_last_updated".to_string(),
            value: json!(to_iso_string(projects_timestamp)),
            updated_at: projects_timestamp,
        },
        MetaEntry {
            key: "posts_last_updated".to_string(),
            value: json!(to_iso_string(posts_timestamp)),
            updated_at: posts_timestamp,
        },
        MetaEntry {
            key: "now_narrative".to_string(),
            value: json!(narrative),
            updated_at: now_timestamp,
        },
    ];

    if let Some(global_timestamp) = latest_timestamp(&[
        uses_timestamp,
        now_timestamp,
        projects_timestamp,
        posts_timestamp,
    ]) {
        entries.push(MetaEntry {
            key: "global_last_updated".to_string(),
            value: json!(to_iso_string(global_timestamp)),
            updated_at: global_timestamp,
        });
    }

    entries
}

/// Runs one full bootstrap import. Resource kinds are reconciled
/// sequentially; a persistence failure aborts the run and leaves earlier
/// kinds committed — re-running is safe because classification turns
/// already-applied rows into unchanged.
pub async fn run_bootstrap_import(
    pool: &PgPool,
    snapshot: &ContentSnapshot,
    options: RunImportOptions,
) -> Result<ImportSummary, sqlx::Error> {
    let execution_timestamp = options.execution_timestamp.unwrap_or_else(Utc::now);

    let uses_timestamp =
        resolve_resource_timestamp(snapshot.uses.last_updated, execution_timestamp);
    let now_timestamp = resolve_resource_timestamp(snapshot.now.last_updated, execution_timestamp);
    let projects_timestamp =
        resolve_resource_timestamp(snapshot.projects.last_updated, execution_timestamp);
    let posts_timestamp =
        resolve_resource_timestamp(snapshot.posts.last_updated, execution_timestamp);

    let desired_uses = build_desired_uses(&snapshot.uses, uses_timestamp);
    let desired_now_entries = build_desired_now_entries(&snapshot.now, now_timestamp);
    let desired_projects = build_desired_projects(&snapshot.projects, projects_timestamp);
    let desired_posts = build_desired_posts(&snapshot.posts, posts_timestamp);

    info!(
        mode = options.mode.as_str(),
        uses = desired_uses.len(),
        now_entries = desired_now_entries.len(),
        projects = desired_projects.len(),
        posts = desired_posts.len(),
        "Starting bootstrap import"
    );

    let uses_summary =
        sync_resource(pool, options.mode, uses_timestamp, &desired_uses).await?;
    let now_summary =
        sync_resource(pool, options.mode, now_timestamp, &desired_now_entries).await?;
    let projects_summary =
        sync_resource(pool, options.mode, projects_timestamp, &desired_projects).await?;
    let posts_summary =
        sync_resource(pool, options.mode, posts_timestamp, &desired_posts).await?;

    let meta_entries = build_meta_entries(
        &snapshot.now.narrative,
        uses_timestamp,
        now_timestamp,
        projects_timestamp,
        posts_timestamp,
    );
    let meta_summary = sync_meta(pool, options.mode, &meta_entries).await?;

    info!(mode = options.mode.as_str(), "Bootstrap import finished");

    Ok(ImportSummary {
        mode: options.mode,
        uses: uses_summary,
        now_entries: now_summary,
        projects: projects_summary,
        posts: posts_summary,
        meta: meta_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::snapshot::{
        NowEntrySnapshot, PostSnapshot, ProjectSnapshot, ProjectSource, UseItemSnapshot,
        UseSectionSnapshot,
    };
    use crate::importer::sync::DesiredRow;

    fn timestamp(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    fn uses_group() -> UsesGroup {
        UsesGroup {
            last_updated: Some(timestamp("2026-02-20T00:00:00Z")),
            sections: vec![
                UseSectionSnapshot {
                    title: "Dev stack".to_string(),
                    items: vec![UseItemSnapshot {
                        label: "Editor".to_string(),
                        value: "Helix".to_string(),
                    }],
                },
                UseSectionSnapshot {
                    title: "AI stack".to_string(),
                    items: vec![],
                },
            ],
        }
    }

    #[test]
    fn resolves_group_timestamp_with_execution_fallback() {
        let fallback = timestamp("2026-03-01T00:00:00Z");
        let explicit = timestamp("2026-02-20T00:00:00Z");
        assert_eq!(resolve_resource_timestamp(Some(explicit), fallback), explicit);
        assert_eq!(resolve_resource_timestamp(None, fallback), fallback);
    }

    #[test]
    fn sort_offsets_make_earlier_rows_sort_later() {
        let base = timestamp("2026-02-20T00:00:00Z");
        let first = with_sort_offset(base, 0);
        let second = with_sort_offset(base, 1);
        assert_eq!(first, base);
        assert!(first > second);
        assert_eq!((first - second).num_milliseconds(), 1);
    }

    #[test]
    fn builds_desired_uses_with_slugs_and_offsets() {
        let base = timestamp("2026-02-20T00:00:00Z");
        let desired = build_desired_uses(&uses_group(), base);

        assert_eq!(desired.len(), 2);
        assert_eq!(desired[0].slug, "uses-dev-stack");
        assert_eq!(desired[1].slug, "uses-ai-stack");
        assert_eq!(desired[0].updated_at, base);
        assert_eq!(desired[1].updated_at, with_sort_offset(base, 1));
        assert_eq!(desired[0].payload["source"], PAYLOAD_SOURCE);
        assert_eq!(desired[0].payload["items"][0]["label"], "Editor");
    }

    #[test]
    fn colliding_titles_get_deduplicated_slugs() {
        let group = UsesGroup {
            last_updated: None,
            sections: vec![
                UseSectionSnapshot {
                    title: "Dev Stack".to_string(),
                    items: vec![],
                },
                UseSectionSnapshot {
                    title: "dev stack!".to_string(),
                    items: vec![],
                },
            ],
        };

        let desired = build_desired_uses(&group, timestamp("2026-02-20T00:00:00Z"));
        assert_eq!(desired[0].slug, "uses-dev-stack");
        assert_eq!(desired[1].slug, "uses-dev-stack-2");
    }

    #[test]
    fn builds_now_entries_with_sort_order() {
        let group = NowGroup {
            last_updated: None,
            narrative: "Ship and learn.".to_string(),
            entries: vec![
                NowEntrySnapshot {
                    label: "Focus".to_string(),
                    text: "API endpoints.".to_string(),
                    href: None,
                },
                NowEntrySnapshot {
                    label: "Learning".to_string(),
                    text: "Backend fundamentals.".to_string(),
                    href: Some("https://example.com".to_string()),
                },
            ],
        };

        let desired = build_desired_now_entries(&group, timestamp("2026-02-21T00:00:00Z"));
        assert_eq!(desired[0].slug, "now-focus");
        assert_eq!(desired[0].sort_order, 0);
        assert_eq!(desired[1].sort_order, 1);
        assert_eq!(desired[1].href.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn project_slugs_embed_the_source_group() {
        let group = ProjectsGroup {
            last_updated: None,
            items: vec![
                ProjectSnapshot {
                    source_group: ProjectSource::ActiveProjects,
                    title: "Harness".to_string(),
                    summary: "Primary.".to_string(),
                    href: None,
                    payload: serde_json::Map::new(),
                },
                ProjectSnapshot {
                    source_group: ProjectSource::AiProjects,
                    title: "Harness".to_string(),
                    summary: "Secondary.".to_string(),
                    href: None,
                    payload: serde_json::Map::new(),
                },
            ],
        };

        let desired = build_desired_projects(&group, timestamp("2026-02-22T00:00:00Z"));
        assert_eq!(desired[0].slug, "active-projects-harness");
        assert_eq!(desired[1].slug, "ai-projects-harness");
    }

    #[test]
    fn authored_post_slugs_pass_through_but_deduplicate() {
        let post = |slug: &str| PostSnapshot {
            slug: slug.to_string(),
            title: "T".to_string(),
            summary: "S".to_string(),
            body_markdown: "B".to_string(),
            published_at: timestamp("2026-02-18T00:00:00Z"),
            updated_at_source: None,
            author: None,
            featured: false,
            tags: vec![],
            reading_time_text: None,
            reading_time_minutes: None,
            payload: serde_json::Map::new(),
        };

        let group = PostsGroup {
            last_updated: None,
            items: vec![post("shipping-principles"), post("shipping-principles")],
        };

        let desired = build_desired_posts(&group, timestamp("2026-02-24T00:00:00Z"));
        assert_eq!(desired[0].slug(), "shipping-principles");
        assert_eq!(desired[1].slug(), "shipping-principles-2");
    }

    #[test]
    fn meta_batch_always_carries_all_per_kind_keys_and_global_max() {
        let uses = timestamp("2026-02-20T00:00:00Z");
        let now = timestamp("2026-02-21T00:00:00Z");
        let projects = timestamp("2026-02-22T00:00:00Z");
        let posts = timestamp("2026-02-24T00:00:00Z");

        let entries = build_meta_entries("Ship and learn.", uses, now, projects, posts);
        let keys: Vec<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                "uses_last_updated",
                "now_last_updated",
                "projects_last_updated",
                "posts_last_updated",
                "now_narrative",
                "global_last_updated",
            ]
        );

        let global = entries.last().unwrap();
        assert_eq!(global.updated_at, posts);
        assert_eq!(global.value, json!("2026-02-24T00:00:00.000Z"));

        let narrative = &entries[4];
        assert_eq!(narrative.value, json!("Ship and learn."));
        assert_eq!(narrative.updated_at, now);
    }

    #[test]
    fn single_group_timestamp_dominates_the_global_key() {
        // Only the uses group has an authored timestamp; every other kind
        // fell back to an earlier execution timestamp.
        let execution = timestamp("2026-01-01T00:00:00Z");
        let uses = timestamp("2026-02-20T00:00:00Z");

        let entries = build_meta_entries("", uses, execution, execution, execution);
        let global = entries.last().unwrap();
        assert_eq!(global.key, "global_last_updated");
        assert_eq!(global.updated_at, uses);
    }
}
