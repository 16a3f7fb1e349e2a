//! Resource reconciliation: diffs desired rows against existing rows by slug
//! and applies inserts/updates/deactivations. Classification is pure and
//! shared verbatim between apply and dry-run; only the write step is gated.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    Apply,
    DryRun,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Apply => "apply",
            ImportMode::DryRun => "dry-run",
        }
    }
}

/// Four-way fate of a row within one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDecision {
    Insert,
    Update,
    Unchanged,
    Deactivate,
}

/// Bookkeeping columns shared by every resource table.
pub trait ExistingRow {
    fn id(&self) -> i64;
    fn slug(&self) -> &str;
    fn version(&self) -> i32;
    fn is_active(&self) -> bool;
}

/// A desired row with its slug already assigned, comparable against the
/// stored projection for its kind.
pub trait DesiredRow {
    type Existing: ExistingRow;

    fn slug(&self) -> &str;

    /// Structural equality over every content field (deep equality for JSON
    /// payloads). Activation state is checked separately by `classify`.
    fn matches(&self, existing: &Self::Existing) -> bool;
}

/// The persistence half of a resource kind. Kept separate from `DesiredRow`
/// so classification stays pure and testable without a database.
#[async_trait]
pub trait PersistRow: DesiredRow + Send + Sync {
    const TABLE: &'static str;

    async fn fetch_existing(pool: &PgPool) -> Result<Vec<Self::Existing>, sqlx::Error>;
    async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error>;
    async fn update(&self, pool: &PgPool, id: i64, next_version: i32)
        -> Result<(), sqlx::Error>;
}

/// Pure classification. `desired = None` models the deactivation sweep for a
/// slug absent from this run; an already-inactive stale row needs no action.
pub fn classify<D: DesiredRow>(
    existing: Option<&D::Existing>,
    desired: Option<&D>,
) -> Option<RowDecision> {
    match (existing, desired) {
        (None, Some(_)) => Some(RowDecision::Insert),
        (Some(existing), Some(desired)) => {
            if desired.matches(existing) && existing.is_active() {
                Some(RowDecision::Unchanged)
            } else {
                Some(RowDecision::Update)
            }
        }
        (Some(existing), None) => existing.is_active().then_some(RowDecision::Deactivate),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub inserted: u32,
    pub updated: u32,
    pub deactivated: u32,
    pub unchanged: u32,
}

impl ResourceSummary {
    pub fn record(&mut self, decision: RowDecision) {
        match decision {
            RowDecision::Insert => self.inserted += 1,
            RowDecision::Update => self.updated += 1,
            RowDecision::Unchanged => self.unchanged += 1,
            RowDecision::Deactivate => self.deactivated += 1,
        }
    }
}

/// Runs one resource kind's reconciliation pass. Desired rows are processed
/// in snapshot order; stale active rows are swept afterwards and stamped with
/// the resource-level timestamp rather than a per-row one.
pub async fn sync_resource<D>(
    pool: &PgPool,
    mode: ImportMode,
    resource_updated_at: DateTime<Utc>,
    desired_rows: &[D],
) -> Result<ResourceSummary, sqlx::Error>
where
    D: PersistRow,
{
    let existing_rows = D::fetch_existing(pool).await?;
    let existing_by_slug: HashMap<&str, &D::Existing> = existing_rows
        .iter()
        .map(|existing| (existing.slug(), existing))
        .collect();
    let desired_slugs: HashSet<&str> = desired_rows.iter().map(|desired| desired.slug()).collect();

    let mut summary = ResourceSummary::default();

    for desired in desired_rows {
        let existing = existing_by_slug.get(desired.slug()).copied();

        match classify(existing, Some(desired)) {
            Some(RowDecision::Insert) => {
                summary.record(RowDecision::Insert);
                if mode == ImportMode::Apply {
                    desired.insert(pool).await?;
                }
            }
            Some(RowDecision::Update) => {
                summary.record(RowDecision::Update);
                if let (ImportMode::Apply, Some(existing)) = (mode, existing) {
                    desired
                        .update(pool, existing.id(), existing.version() + 1)
                        .await?;
                }
            }
            Some(RowDecision::Unchanged) => summary.record(RowDecision::Unchanged),
            _ => {}
        }
    }

    for stale in existing_rows
        .iter()
        .filter(|existing| existing.is_active() && !desired_slugs.contains(existing.slug()))
    {
        summary.record(RowDecision::Deactivate);
        if mode == ImportMode::Apply {
            deactivate_row::<D>(pool, stale.id(), stale.version() + 1, resource_updated_at).await?;
        }
    }

    Ok(summary)
}

async fn deactivate_row<D: PersistRow>(
    pool: &PgPool,
    id: i64,
    next_version: i32,
    updated_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let statement = format!(
        "UPDATE {} SET is_active = FALSE, version = $1, updated_at = $2 WHERE id = $3",
        D::TABLE
    );

    sqlx::query(&statement)
        .bind(next_version)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
