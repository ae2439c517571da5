//! Jobs command - Background job management.
//!
//! - `work`: run the notification worker
//! - `list`: show queue counts by status
//! - `clear`: remove failed jobs
//!
//! ```bash
//! hostel-manager jobs work
//! hostel-manager jobs list
//! ```

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_WORKER_NOTIFICATIONS};
use crate::errors::{AppError, AppResult};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Process queued notifications until Ctrl+C.
///
/// Each job becomes a row in `notifications` for its recipient.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;
    use apalis_sql::postgres::PostgresStorage;
    use apalis_sql::sqlx::postgres::PgPoolOptions;

    use crate::jobs::{notification_job_handler, NotificationJob};

    tracing::info!("Connecting to database for job worker...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    let storage: PostgresStorage<NotificationJob> = PostgresStorage::new(pool);

    // The handler writes notifications through sea-orm
    let db = connect(config).await?;

    tracing::info!(worker = JOB_WORKER_NOTIFICATIONS, "Job worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new(JOB_WORKER_NOTIFICATIONS)
        .data(db)
        .backend(storage)
        .build_fn(notification_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    sea_orm::Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))
}

/// The apalis schema only exists once a worker has run `setup`.
async fn queue_exists(db: &DatabaseConnection) -> AppResult<bool> {
    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Job queue not initialized. Run 'jobs work' first to create the queue tables.");
        return Ok(());
    }

    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT job_type, status::text as status, COUNT(*)::bigint as count \
             FROM apalis.jobs GROUP BY job_type, status ORDER BY job_type, status",
        ))
        .await?;

    println!("\n=== Job Queue Status ===");
    if rows.is_empty() {
        println!("No jobs.");
    }
    for row in rows {
        if let (Ok(job_type), Ok(status), Ok(count)) = (
            row.try_get::<String>("", "job_type"),
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            println!("{:<40} {:<10} {}", job_type, status, count);
        }
    }
    println!("========================\n");

    Ok(())
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_exists(&db).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'",
        ))
        .await?;

    tracing::info!(count = result.rows_affected(), "Cleared failed jobs");
    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());

    Ok(())
}
