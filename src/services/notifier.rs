//! Outbound notifications for allocation workflow events.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::jobs::NotificationJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Hands notification jobs to whatever delivers them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, job: NotificationJob) -> AppResult<()>;
}

/// Queues jobs in the apalis PostgreSQL storage for `jobs work`.
#[derive(Clone)]
pub struct QueueNotifier {
    storage: PostgresStorage<NotificationJob>,
}

impl QueueNotifier {
    pub fn new(storage: PostgresStorage<NotificationJob>) -> Self {
        Self { storage }
    }

    /// Open a small pool and make sure the queue tables exist.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await
            .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;

        PostgresStorage::setup(&pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

        Ok(Self::new(PostgresStorage::new(pool)))
    }
}

#[async_trait]
impl Notifier for QueueNotifier {
    async fn notify(&self, job: NotificationJob) -> AppResult<()> {
        let kind = job.kind;
        let user_id = job.user_id;
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue notification: {}", e)))?;
        tracing::debug!(user_id = %user_id, kind = %kind, "Notification queued");
        Ok(())
    }
}
