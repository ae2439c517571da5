//! Complaint repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::complaint::{self, ActiveModel, Entity as ComplaintEntity};
use crate::domain::{Complaint, ComplaintStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Complaint>>;

    async fn list(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Complaint>>;

    async fn create(&self, complaint: Complaint) -> AppResult<Complaint>;

    async fn update(&self, complaint: Complaint) -> AppResult<Complaint>;

    async fn count_by_status(&self, status: ComplaintStatus) -> AppResult<u64>;
}

fn active_model(complaint: Complaint) -> ActiveModel {
    ActiveModel {
        id: Set(complaint.id),
        user_id: Set(complaint.user_id),
        title: Set(complaint.title),
        description: Set(complaint.description),
        category: Set(complaint.category.to_string()),
        priority: Set(complaint.priority.to_string()),
        status: Set(complaint.status.to_string()),
        created_at: Set(complaint.created_at),
        updated_at: Set(complaint.updated_at),
        resolved_at: Set(complaint.resolved_at),
    }
}

pub struct ComplaintStore {
    db: DatabaseConnection,
}

impl ComplaintStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ComplaintRepository for ComplaintStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Complaint>> {
        ComplaintEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Complaint::try_from)
            .transpose()
    }

    async fn list(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>> {
        let mut query = ComplaintEntity::find().order_by_desc(complaint::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(complaint::Column::Status.eq(status.as_str()));
        }

        let models = query.all(&self.db).await.map_err(AppError::from)?;
        models.into_iter().map(Complaint::try_from).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Complaint>> {
        let models = ComplaintEntity::find()
            .filter(complaint::Column::UserId.eq(user_id))
            .order_by_desc(complaint::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(Complaint::try_from).collect()
    }

    async fn create(&self, complaint: Complaint) -> AppResult<Complaint> {
        let model = active_model(complaint)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Complaint::try_from(model)
    }

    async fn update(&self, complaint: Complaint) -> AppResult<Complaint> {
        let model = active_model(complaint)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Complaint::try_from(model)
    }

    async fn count_by_status(&self, status: ComplaintStatus) -> AppResult<u64> {
        ComplaintEntity::find()
            .filter(complaint::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
