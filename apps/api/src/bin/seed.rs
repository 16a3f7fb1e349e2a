//! Bootstrap import CLI: reconciles the site content snapshot into the
//! database. Pass `--dry-run` to print the summary without writing.

use std::path::Path;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use site_api::config::Config;
use site_api::db::create_pool;
use site_api::importer::run::{run_bootstrap_import, ImportSummary, RunImportOptions};
use site_api::importer::snapshot::load_snapshot;
use site_api::importer::sync::{ImportMode, ResourceSummary};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("site_api={}", &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = if std::env::args().any(|argument| argument == "--dry-run") {
        ImportMode::DryRun
    } else {
        ImportMode::Apply
    };

    let snapshot = load_snapshot(Path::new(&config.snapshot_path))?;
    let pool = create_pool(&config.database_url).await?;

    let summary = run_bootstrap_import(
        &pool,
        &snapshot,
        RunImportOptions {
            mode,
            execution_timestamp: None,
        },
    )
    .await?;

    print_summary(&summary);

    pool.close().await;
    Ok(())
}

fn format_resource_summary_line(label: &str, summary: &ResourceSummary) -> String {
    format!(
        "{label}: inserted={}, updated={}, deactivated={}, unchanged={}",
        summary.inserted, summary.updated, summary.deactivated, summary.unchanged
    )
}

fn print_summary(summary: &ImportSummary) {
    println!("Bootstrap import mode: {}", summary.mode.as_str());
    println!("{}", format_resource_summary_line("uses", &summary.uses));
    println!(
        "{}",
        format_resource_summary_line("now_entries", &summary.now_entries)
    );
    println!(
        "{}",
        format_resource_summary_line("projects", &summary.projects)
    );
    println!("{}", format_resource_summary_line("posts", &summary.posts));
    println!(
        "meta: inserted={}, updated={}, unchanged={}",
        summary.meta.inserted, summary.meta.updated, summary.meta.unchanged
    );
}
