//! Leave request repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::leave_request::{self, ActiveModel, Entity as LeaveEntity};
use crate::domain::{LeaveRequest, LeaveStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LeaveRequest>>;

    async fn list(&self, status: Option<LeaveStatus>) -> AppResult<Vec<LeaveRequest>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<LeaveRequest>>;

    async fn create(&self, leave: LeaveRequest) -> AppResult<LeaveRequest>;

    async fn update(&self, leave: LeaveRequest) -> AppResult<LeaveRequest>;

    async fn count_by_status(&self, status: LeaveStatus) -> AppResult<u64>;
}

fn active_model(leave: LeaveRequest) -> ActiveModel {
    ActiveModel {
        id: Set(leave.id),
        user_id: Set(leave.user_id),
        reason: Set(leave.reason),
        start_date: Set(leave.start_date),
        end_date: Set(leave.end_date),
        status: Set(leave.status.to_string()),
        reviewed_by: Set(leave.reviewed_by),
        created_at: Set(leave.created_at),
        updated_at: Set(leave.updated_at),
    }
}

pub struct LeaveStore {
    db: DatabaseConnection,
}

impl LeaveStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeaveRepository for LeaveStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LeaveRequest>> {
        LeaveEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn list(&self, status: Option<LeaveStatus>) -> AppResult<Vec<LeaveRequest>> {
        let mut query = LeaveEntity::find().order_by_asc(leave_request::Column::StartDate);
        if let Some(status) = status {
            query = query.filter(leave_request::Column::Status.eq(status.as_str()));
        }

        let models = query.all(&self.db).await.map_err(AppError::from)?;
        models.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<LeaveRequest>> {
        let models = LeaveEntity::find()
            .filter(leave_request::Column::UserId.eq(user_id))
            .order_by_desc(leave_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn create(&self, leave: LeaveRequest) -> AppResult<LeaveRequest> {
        let model = active_model(leave)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        LeaveRequest::try_from(model)
    }

    async fn update(&self, leave: LeaveRequest) -> AppResult<LeaveRequest> {
        let model = active_model(leave)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        LeaveRequest::try_from(model)
    }

    async fn count_by_status(&self, status: LeaveStatus) -> AppResult<u64> {
        LeaveEntity::find()
            .filter(leave_request::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
