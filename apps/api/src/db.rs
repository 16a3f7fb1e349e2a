use anyhow::Context;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckState,
    pub migrations: CheckState,
    pub query: CheckState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResult {
    pub status: ReadinessStatus,
    pub checks: ReadinessChecks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReadinessResult {
    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}

/// Probes the database for /readyz: connectivity, a trivial query, and the
/// presence of the sqlx migrations table. Never returns an error; failures
/// are folded into the result.
pub async fn check_database_readiness(pool: &PgPool) -> ReadinessResult {
    let mut checks = ReadinessChecks {
        database: CheckState::Failed,
        migrations: CheckState::Failed,
        query: CheckState::Failed,
    };

    let outcome: anyhow::Result<()> = async {
        pool.acquire()
            .await
            .context("failed to acquire database connection")?;
        checks.database = CheckState::Ok;

        sqlx::query("SELECT 1 AS health_check")
            .execute(pool)
            .await
            .context("simple query path failed")?;
        checks.query = CheckState::Ok;

        let migrations_table_present: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM information_schema.tables
                WHERE table_name = '_sqlx_migrations'
            )
            "#,
        )
        .fetch_one(pool)
        .await
        .context("migration state query failed")?;

        if !migrations_table_present {
            anyhow::bail!("_sqlx_migrations table not found");
        }
        checks.migrations = CheckState::Ok;

        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => ReadinessResult {
            status: ReadinessStatus::Ready,
            checks,
            message: None,
        },
        Err(error) => ReadinessResult {
            status: ReadinessStatus::NotReady,
            checks,
            message: Some(error.to_string()),
        },
    }
}
