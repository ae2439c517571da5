//! Notification inbox.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Notification;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Newest first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        self.uow.notifications().list_for_user(user_id).await
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
        self.uow.notifications().mark_read(id, user_id).await
    }
}
