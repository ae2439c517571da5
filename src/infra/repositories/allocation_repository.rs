//! Room allocation repository implementation.
//!
//! Allocations are created and ended inside the approval and deallocation
//! transactions (see `unit_of_work`); this repository only reads them.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::room_allocation::{self, Entity as AllocationEntity};
use crate::domain::RoomAllocation;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AllocationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoomAllocation>>;

    /// All allocations, newest first. `active` filters on end_date.
    async fn list(&self, active: Option<bool>) -> AppResult<Vec<RoomAllocation>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoomAllocation>>;

    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<RoomAllocation>>;

    async fn count_active(&self) -> AppResult<u64>;
}

/// Concrete implementation of AllocationRepository
pub struct AllocationStore {
    db: DatabaseConnection,
}

impl AllocationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AllocationRepository for AllocationStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoomAllocation>> {
        let result = AllocationEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(RoomAllocation::from))
    }

    async fn list(&self, active: Option<bool>) -> AppResult<Vec<RoomAllocation>> {
        let mut query = AllocationEntity::find().order_by_desc(room_allocation::Column::CreatedAt);
        query = match active {
            Some(true) => query.filter(room_allocation::Column::EndDate.is_null()),
            Some(false) => query.filter(room_allocation::Column::EndDate.is_not_null()),
            None => query,
        };

        let models = query.all(&self.db).await.map_err(AppError::from)?;
        Ok(models.into_iter().map(RoomAllocation::from).collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoomAllocation>> {
        let models = AllocationEntity::find()
            .filter(room_allocation::Column::UserId.eq(user_id))
            .order_by_desc(room_allocation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(RoomAllocation::from).collect())
    }

    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<RoomAllocation>> {
        let result = AllocationEntity::find()
            .filter(room_allocation::Column::UserId.eq(user_id))
            .filter(room_allocation::Column::EndDate.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(RoomAllocation::from))
    }

    async fn count_active(&self) -> AppResult<u64> {
        AllocationEntity::find()
            .filter(room_allocation::Column::EndDate.is_null())
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
