//! Notification repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use crate::domain::Notification;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> AppResult<Notification>;

    /// A user's notifications, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;

    /// Mark one of the user's notifications as read
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<Notification>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64>;
}

pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn create(&self, notification: Notification) -> AppResult<Notification> {
        let active_model = ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            kind: Set(notification.kind.to_string()),
            title: Set(notification.title),
            message: Set(notification.message),
            read: Set(notification.read),
            created_at: Set(notification.created_at),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Notification::try_from(model)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let models = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<Notification> {
        // Another user's notification is reported as missing
        let model = NotificationEntity::find_by_id(id)
            .filter(notification::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.read = Set(true);
        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Notification::try_from(model)
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
