//! Room request repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::room_request::{self, ActiveModel, Entity as RequestEntity};
use crate::domain::{RequestStatus, RoomRequest};
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Room request repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomRequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoomRequest>>;

    /// Admin queue: highest priority first, then oldest first
    async fn list(
        &self,
        status: Option<RequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<RoomRequest>, u64)>;

    /// A user's requests, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoomRequest>>;

    /// The user's pending or waitlisted request, if any
    async fn find_open_for_user(&self, user_id: Uuid) -> AppResult<Option<RoomRequest>>;

    async fn create(&self, request: RoomRequest) -> AppResult<RoomRequest>;

    async fn update(&self, request: RoomRequest) -> AppResult<RoomRequest>;

    async fn count_by_status(&self, status: RequestStatus) -> AppResult<u64>;
}

fn active_model(request: RoomRequest) -> ActiveModel {
    ActiveModel {
        id: Set(request.id),
        user_id: Set(request.user_id),
        preferred_room_type: Set(request.preferred_room_type),
        preferred_floor: Set(request.preferred_floor),
        priority_score: Set(request.priority_score),
        notes: Set(request.notes),
        status: Set(request.status.to_string()),
        requested_at: Set(request.requested_at),
        updated_at: Set(request.updated_at),
    }
}

async fn find_request<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<RoomRequest>> {
    RequestEntity::find_by_id(id)
        .one(conn)
        .await
        .map_err(AppError::from)?
        .map(RoomRequest::try_from)
        .transpose()
}

pub(crate) async fn save_request<C: ConnectionTrait>(
    conn: &C,
    request: RoomRequest,
) -> AppResult<RoomRequest> {
    let model = active_model(request)
        .update(conn)
        .await
        .map_err(AppError::from)?;
    RoomRequest::try_from(model)
}

/// Concrete implementation of RoomRequestRepository
pub struct RoomRequestStore {
    db: DatabaseConnection,
}

impl RoomRequestStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRequestRepository for RoomRequestStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoomRequest>> {
        find_request(&self.db, id).await
    }

    async fn list(
        &self,
        status: Option<RequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<RoomRequest>, u64)> {
        let mut query = RequestEntity::find()
            .order_by_desc(room_request::Column::PriorityScore)
            .order_by_asc(room_request::Column::RequestedAt);
        if let Some(status) = status {
            query = query.filter(room_request::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        let requests = models
            .into_iter()
            .map(RoomRequest::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((requests, total))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoomRequest>> {
        let models = RequestEntity::find()
            .filter(room_request::Column::UserId.eq(user_id))
            .order_by_desc(room_request::Column::RequestedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(RoomRequest::try_from).collect()
    }

    async fn find_open_for_user(&self, user_id: Uuid) -> AppResult<Option<RoomRequest>> {
        let open = [
            RequestStatus::Pending.as_str(),
            RequestStatus::Waitlisted.as_str(),
        ];
        RequestEntity::find()
            .filter(room_request::Column::UserId.eq(user_id))
            .filter(room_request::Column::Status.is_in(open))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(RoomRequest::try_from)
            .transpose()
    }

    async fn create(&self, request: RoomRequest) -> AppResult<RoomRequest> {
        let model = active_model(request)
            .insert(&self.db)
            .await
            .or_conflict("Open room request")?;
        RoomRequest::try_from(model)
    }

    async fn update(&self, request: RoomRequest) -> AppResult<RoomRequest> {
        save_request(&self.db, request).await
    }

    async fn count_by_status(&self, status: RequestStatus) -> AppResult<u64> {
        RequestEntity::find()
            .filter(room_request::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
