//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-table writes (approval,
//! deallocation, room and hostel edits) inside a single read-committed
//! transaction. Repositories handed out by [`TransactionContext`] share that
//! transaction and read rows with `FOR UPDATE`, so writers touching the same
//! room or hostel queue on the row lock instead of overwriting each other.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{hostel, room, room_allocation, room_request};
use super::repositories::hostel_repository::save_hostel;
use super::repositories::request_repository::save_request;
use super::repositories::room_repository::save_room;
use super::repositories::{
    AllocationRepository, AllocationStore, ComplaintRepository, ComplaintStore, HostelRepository,
    HostelStore, LeaveRepository, LeaveStore, NotificationRepository, NotificationStore,
    PaymentRepository, PaymentStore, RoomRepository, RoomRequestRepository, RoomRequestStore,
    RoomStore, UserRepository, UserStore,
};
use crate::domain::{Hostel, Room, RoomAllocation, RoomRequest};
use crate::errors::{AppError, AppResult, DbResultExt};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable through `automock` because of the generic transaction
/// methods; tests provide their own implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn hostels(&self) -> Arc<dyn HostelRepository>;
    fn rooms(&self) -> Arc<dyn RoomRepository>;
    fn requests(&self) -> Arc<dyn RoomRequestRepository>;
    fn allocations(&self) -> Arc<dyn AllocationRepository>;
    fn complaints(&self) -> Arc<dyn ComplaintRepository>;
    fn leaves(&self) -> Arc<dyn LeaveRepository>;
    fn payments(&self) -> Arc<dyn PaymentRepository>;
    fn notifications(&self) -> Arc<dyn NotificationRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn requests(&self) -> TxRequestRepository<'_> {
        TxRequestRepository { txn: self.txn }
    }

    pub fn rooms(&self) -> TxRoomRepository<'_> {
        TxRoomRepository { txn: self.txn }
    }

    pub fn allocations(&self) -> TxAllocationRepository<'_> {
        TxAllocationRepository { txn: self.txn }
    }

    pub fn hostels(&self) -> TxHostelRepository<'_> {
        TxHostelRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    hostel_repo: Arc<HostelStore>,
    room_repo: Arc<RoomStore>,
    request_repo: Arc<RoomRequestStore>,
    allocation_repo: Arc<AllocationStore>,
    complaint_repo: Arc<ComplaintStore>,
    leave_repo: Arc<LeaveStore>,
    payment_repo: Arc<PaymentStore>,
    notification_repo: Arc<NotificationStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            hostel_repo: Arc::new(HostelStore::new(db.clone())),
            room_repo: Arc::new(RoomStore::new(db.clone())),
            request_repo: Arc::new(RoomRequestStore::new(db.clone())),
            allocation_repo: Arc::new(AllocationStore::new(db.clone())),
            complaint_repo: Arc::new(ComplaintStore::new(db.clone())),
            leave_repo: Arc::new(LeaveStore::new(db.clone())),
            payment_repo: Arc::new(PaymentStore::new(db.clone())),
            notification_repo: Arc::new(NotificationStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn hostels(&self) -> Arc<dyn HostelRepository> {
        self.hostel_repo.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomRepository> {
        self.room_repo.clone()
    }

    fn requests(&self) -> Arc<dyn RoomRequestRepository> {
        self.request_repo.clone()
    }

    fn allocations(&self) -> Arc<dyn AllocationRepository> {
        self.allocation_repo.clone()
    }

    fn complaints(&self) -> Arc<dyn ComplaintRepository> {
        self.complaint_repo.clone()
    }

    fn leaves(&self) -> Arc<dyn LeaveRepository> {
        self.leave_repo.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repo.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(f).await
    }
}

/// Transaction-aware room request access.
pub struct TxRequestRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRequestRepository<'a> {
    /// Load a request and hold a row lock on it until the transaction ends
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<RoomRequest>> {
        room_request::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?
            .map(RoomRequest::try_from)
            .transpose()
    }

    pub async fn save(&self, request: RoomRequest) -> AppResult<RoomRequest> {
        save_request(self.txn, request).await
    }
}

/// Transaction-aware room access.
pub struct TxRoomRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRoomRepository<'a> {
    /// Load a room and hold a row lock on it until the transaction ends
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Room>> {
        room::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?
            .map(Room::try_from)
            .transpose()
    }

    pub async fn save(&self, room: Room) -> AppResult<Room> {
        save_room(self.txn, room).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        room::Entity::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

/// Transaction-aware allocation writes.
pub struct TxAllocationRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAllocationRepository<'a> {
    pub async fn create(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        request_id: Option<Uuid>,
        allocated_by: Option<Uuid>,
    ) -> AppResult<RoomAllocation> {
        let active_model = room_allocation::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            room_id: Set(room_id),
            request_id: Set(request_id),
            allocated_by: Set(allocated_by),
            created_at: Set(Utc::now()),
            end_date: Set(None),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .or_conflict("Active allocation")?;
        Ok(RoomAllocation::from(model))
    }

    /// The occupant's open allocation, as seen inside the transaction
    pub async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<RoomAllocation>> {
        let result = room_allocation::Entity::find()
            .filter(room_allocation::Column::UserId.eq(user_id))
            .filter(room_allocation::Column::EndDate.is_null())
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(RoomAllocation::from))
    }

    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<RoomAllocation>> {
        let result = room_allocation::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(RoomAllocation::from))
    }

    /// Persist the end date of an allocation
    pub async fn save_end(&self, allocation: &RoomAllocation) -> AppResult<()> {
        let active_model = room_allocation::ActiveModel {
            id: Set(allocation.id),
            end_date: Set(allocation.end_date),
            ..Default::default()
        };
        active_model.update(self.txn).await.map_err(AppError::from)?;
        Ok(())
    }
}

/// Transaction-aware hostel occupancy bookkeeping.
pub struct TxHostelRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxHostelRepository<'a> {
    /// Load a hostel and hold a row lock on it until the transaction ends
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Hostel>> {
        let result = hostel::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Hostel::from))
    }

    pub async fn save(&self, hostel: Hostel) -> AppResult<Hostel> {
        save_hostel(self.txn, hostel).await
    }

    /// Shift the hostel's current occupancy by `delta`, never below zero.
    pub async fn adjust_occupancy(&self, hostel_id: Uuid, delta: i32) -> AppResult<()> {
        let Some(model) = hostel::Entity::find_by_id(hostel_id)
            .lock_exclusive()
            .one(self.txn)
            .await?
        else {
            return Err(AppError::NotFound);
        };

        let occupancy = (model.current_occupancy + delta).max(0);
        let mut active: hostel::ActiveModel = model.into();
        active.current_occupancy = Set(occupancy);
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await.map_err(AppError::from)?;
        Ok(())
    }
}

/// Simpler API for executing transactional operations.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
