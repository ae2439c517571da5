//! Allocation service - the room request workflow.
//!
//! A student files a request; an admin approves it into a room, waitlists
//! it or cancels it; later the allocation is ended by deallocation.
//!
//! Approval runs in three stages:
//!
//! 1. a cheap pre-check on the current request and room, so stale clicks
//!    fail fast with the request's current status;
//! 2. a per-room distributed lock, so concurrent approvals into the same
//!    room queue up instead of colliding;
//! 3. a transaction that re-reads both rows under row locks, re-checks them
//!    and the student's active allocation, and writes the allocation, the
//!    request status and the occupancy together.
//!
//! The transaction is authoritative, backed by partial unique indexes that
//! allow one open request and one active allocation per student. The
//! earlier stages only make the common failure cases cheap.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{parallel, Actor, Notifier};
use crate::config::LOCK_RESOURCE_ROOM;
use crate::domain::{
    AllocationResponse, RequestStatus, Room, RoomAllocation, RoomRequest, RoomStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{DistributedLock, RoomFilter, UnitOfWork};
use crate::jobs::NotificationJob;
use crate::types::PaginationParams;
use crate::with_transaction;

/// A student's room preferences
#[derive(Debug, Clone, Default)]
pub struct NewRoomRequest {
    pub preferred_room_type: Option<String>,
    pub preferred_floor: Option<i32>,
    pub notes: Option<String>,
}

#[async_trait]
pub trait AllocationService: Send + Sync {
    /// File a request. A student holds at most one open request and one
    /// active allocation.
    async fn create_request(&self, user_id: Uuid, request: NewRoomRequest)
        -> AppResult<RoomRequest>;

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<RoomRequest>, u64)>;

    async fn my_requests(&self, user_id: Uuid) -> AppResult<Vec<RoomRequest>>;

    async fn get_request(&self, actor: Actor, id: Uuid) -> AppResult<RoomRequest>;

    /// Rooms that can take another occupant
    async fn available_rooms(
        &self,
        room_type: Option<String>,
        floor: Option<i32>,
    ) -> AppResult<Vec<Room>>;

    /// Allocate the requester into `room_id`
    async fn approve(
        &self,
        actor: Actor,
        request_id: Uuid,
        room_id: Uuid,
    ) -> AppResult<AllocationResponse>;

    async fn waitlist(&self, actor: Actor, request_id: Uuid) -> AppResult<RoomRequest>;

    /// Cancel an open request; allowed for its owner and for admins
    async fn cancel(&self, actor: Actor, request_id: Uuid) -> AppResult<RoomRequest>;

    async fn list_allocations(&self, active: Option<bool>) -> AppResult<Vec<AllocationResponse>>;

    async fn my_allocations(&self, user_id: Uuid) -> AppResult<Vec<AllocationResponse>>;

    /// End an active allocation and free its bed
    async fn deallocate(&self, actor: Actor, allocation_id: Uuid)
        -> AppResult<AllocationResponse>;
}

fn room_lock(room_id: Uuid) -> String {
    format!("{}{}", LOCK_RESOURCE_ROOM, room_id)
}

fn already_allocated() -> AppError {
    AppError::invalid_state("Student already has a room allocated")
}

pub struct AllocationManager<U: UnitOfWork> {
    uow: Arc<U>,
    lock: Arc<dyn DistributedLock>,
    notifier: Arc<dyn Notifier>,
}

impl<U: UnitOfWork> AllocationManager<U> {
    pub fn new(uow: Arc<U>, lock: Arc<dyn DistributedLock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            uow,
            lock,
            notifier,
        }
    }

    /// Notification delivery never fails the workflow step that caused it.
    async fn notify(&self, job: NotificationJob) {
        let user_id = job.user_id;
        if let Err(e) = self.notifier.notify(job).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to queue notification");
        }
    }

    async fn find_request(&self, id: Uuid) -> AppResult<RoomRequest> {
        self.uow.requests().find_by_id(id).await?.ok_or_not_found()
    }

    /// Attach room details to allocations, looking rooms up concurrently.
    async fn with_rooms(&self, allocations: Vec<RoomAllocation>) -> AppResult<Vec<AllocationResponse>> {
        let rooms = self.uow.rooms();
        let lookups: Vec<_> = allocations
            .iter()
            .map(|a| rooms.find_by_id(a.room_id))
            .collect();
        let found = parallel::join_all(lookups).await?;

        Ok(allocations
            .into_iter()
            .zip(found)
            .map(|(allocation, room)| AllocationResponse::new(allocation, room.as_ref()))
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> AllocationService for AllocationManager<U> {
    async fn create_request(
        &self,
        user_id: Uuid,
        request: NewRoomRequest,
    ) -> AppResult<RoomRequest> {
        if let Some(open) = self.uow.requests().find_open_for_user(user_id).await? {
            return Err(AppError::invalid_state(format!(
                "You already have a {} room request",
                open.status
            )));
        }
        if self
            .uow
            .allocations()
            .find_active_for_user(user_id)
            .await?
            .is_some()
        {
            return Err(AppError::invalid_state("You already have a room allocated"));
        }

        let now = Utc::now();
        let request = RoomRequest {
            id: Uuid::new_v4(),
            user_id,
            preferred_room_type: request.preferred_room_type,
            preferred_floor: request.preferred_floor,
            priority_score: 0,
            notes: request.notes,
            status: RequestStatus::Pending,
            requested_at: now,
            updated_at: now,
        };

        let request = self
            .uow
            .requests()
            .create(request)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => {
                    AppError::invalid_state("You already have an open room request")
                }
                other => other,
            })?;
        tracing::info!(request_id = %request.id, user_id = %user_id, "Room request created");
        Ok(request)
    }

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        params: PaginationParams,
    ) -> AppResult<(Vec<RoomRequest>, u64)> {
        self.uow.requests().list(status, params).await
    }

    async fn my_requests(&self, user_id: Uuid) -> AppResult<Vec<RoomRequest>> {
        self.uow.requests().list_for_user(user_id).await
    }

    async fn get_request(&self, actor: Actor, id: Uuid) -> AppResult<RoomRequest> {
        let request = self.find_request(id).await?;
        if !actor.can_see(request.user_id) {
            return Err(AppError::Forbidden);
        }
        Ok(request)
    }

    async fn available_rooms(
        &self,
        room_type: Option<String>,
        floor: Option<i32>,
    ) -> AppResult<Vec<Room>> {
        self.uow
            .rooms()
            .list(RoomFilter {
                room_type,
                floor,
                available_only: true,
                ..Default::default()
            })
            .await
    }

    async fn approve(
        &self,
        actor: Actor,
        request_id: Uuid,
        room_id: Uuid,
    ) -> AppResult<AllocationResponse> {
        let request = self.find_request(request_id).await?;
        request.ensure_actionable()?;

        if self
            .uow
            .allocations()
            .find_active_for_user(request.user_id)
            .await?
            .is_some()
        {
            return Err(already_allocated());
        }

        let room = self.uow.rooms().find_by_id(room_id).await?.ok_or_not_found()?;
        room.ensure_can_accept()?;

        let guard = self.lock.acquire(&room_lock(room_id)).await?;

        let actor_id = actor.id;
        let result = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut request = ctx
                        .requests()
                        .find_for_update(request_id)
                        .await?
                        .ok_or_not_found()?;
                    request.ensure_actionable()?;
                    if ctx
                        .allocations()
                        .find_active_for_user(request.user_id)
                        .await?
                        .is_some()
                    {
                        return Err(already_allocated());
                    }

                    let mut room = ctx
                        .rooms()
                        .find_for_update(room_id)
                        .await?
                        .ok_or_not_found()?;
                    room.occupy()?;
                    request.transition(RequestStatus::Allocated)?;

                    let allocation = ctx
                        .allocations()
                        .create(request.user_id, room.id, Some(request.id), Some(actor_id))
                        .await
                        .map_err(|e| match e {
                            AppError::Conflict(_) => already_allocated(),
                            other => other,
                        })?;
                    let room = ctx.rooms().save(room).await?;
                    ctx.requests().save(request).await?;
                    ctx.hostels().adjust_occupancy(room.hostel_id, 1).await?;

                    Ok::<_, AppError>((allocation, room))
                })
            })
            .await;

        if let Err(e) = guard.release().await {
            tracing::warn!(room_id = %room_id, error = %e, "Failed to release room lock");
        }
        let (allocation, room) = result?;

        tracing::info!(
            request_id = %request_id,
            room_id = %room_id,
            allocation_id = %allocation.id,
            by = %actor_id,
            "Room request approved"
        );

        self.notify(NotificationJob::request_approved(
            allocation.user_id,
            &room.room_number,
        ))
        .await;

        Ok(AllocationResponse::new(allocation, Some(&room)))
    }

    async fn waitlist(&self, actor: Actor, request_id: Uuid) -> AppResult<RoomRequest> {
        self.find_request(request_id).await?.ensure_actionable()?;

        let request = with_transaction!(self.uow, |ctx| {
            let mut request = ctx
                .requests()
                .find_for_update(request_id)
                .await?
                .ok_or_not_found()?;
            request.transition(RequestStatus::Waitlisted)?;
            ctx.requests().save(request).await
        })?;

        tracing::info!(request_id = %request_id, by = %actor.id, "Room request waitlisted");
        self.notify(NotificationJob::request_waitlisted(request.user_id))
            .await;
        Ok(request)
    }

    async fn cancel(&self, actor: Actor, request_id: Uuid) -> AppResult<RoomRequest> {
        let current = self.find_request(request_id).await?;
        if current.user_id != actor.id && !actor.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        current.ensure_actionable()?;

        let request = with_transaction!(self.uow, |ctx| {
            let mut request = ctx
                .requests()
                .find_for_update(request_id)
                .await?
                .ok_or_not_found()?;
            request.transition(RequestStatus::Cancelled)?;
            ctx.requests().save(request).await
        })?;

        tracing::info!(request_id = %request_id, by = %actor.id, "Room request cancelled");
        if request.user_id != actor.id {
            self.notify(NotificationJob::request_cancelled(request.user_id))
                .await;
        }
        Ok(request)
    }

    async fn list_allocations(&self, active: Option<bool>) -> AppResult<Vec<AllocationResponse>> {
        let allocations = self.uow.allocations().list(active).await?;
        self.with_rooms(allocations).await
    }

    async fn my_allocations(&self, user_id: Uuid) -> AppResult<Vec<AllocationResponse>> {
        let allocations = self.uow.allocations().list_for_user(user_id).await?;
        self.with_rooms(allocations).await
    }

    async fn deallocate(
        &self,
        actor: Actor,
        allocation_id: Uuid,
    ) -> AppResult<AllocationResponse> {
        let current = self
            .uow
            .allocations()
            .find_by_id(allocation_id)
            .await?
            .ok_or_not_found()?;
        if !current.is_active() {
            return Err(AppError::invalid_state("Allocation has already ended"));
        }

        let room_id = current.room_id;
        let guard = self.lock.acquire(&room_lock(room_id)).await?;

        let result = with_transaction!(self.uow, |ctx| {
            let mut allocation = ctx
                .allocations()
                .find_for_update(allocation_id)
                .await?
                .ok_or_not_found()?;
            allocation.end(Utc::now())?;

            let mut room = ctx
                .rooms()
                .find_for_update(allocation.room_id)
                .await?
                .ok_or_not_found()?;
            room.vacate()?;

            ctx.allocations().save_end(&allocation).await?;
            let room = ctx.rooms().save(room).await?;
            ctx.hostels().adjust_occupancy(room.hostel_id, -1).await?;

            Ok::<_, AppError>((allocation, room))
        });

        if let Err(e) = guard.release().await {
            tracing::warn!(room_id = %room_id, error = %e, "Failed to release room lock");
        }
        let (allocation, room) = result?;

        tracing::info!(
            allocation_id = %allocation_id,
            room_id = %room_id,
            by = %actor.id,
            "Allocation ended"
        );
        if room.status == RoomStatus::Available {
            tracing::debug!(room_id = %room_id, free_beds = room.free_beds(), "Room reopened");
        }

        self.notify(NotificationJob::deallocated(
            allocation.user_id,
            &room.room_number,
        ))
        .await;

        Ok(AllocationResponse::new(allocation, Some(&room)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::sample_room;
    use crate::domain::room_request::sample_request;
    use crate::domain::UserRole;
    use crate::infra::{LockGuard, MockDistributedLock};
    use crate::services::testing::TestUnitOfWork;
    use crate::services::MockNotifier;
    use mockall::predicate::eq;

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::Admin)
    }

    fn no_lock() -> Arc<MockDistributedLock> {
        let mut lock = MockDistributedLock::new();
        lock.expect_acquire().never();
        Arc::new(lock)
    }

    fn quiet_notifier() -> Arc<MockNotifier> {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        Arc::new(notifier)
    }

    #[tokio::test]
    async fn test_approve_short_circuits_on_terminal_request() {
        let request = sample_request(RequestStatus::Allocated);
        let id = request.id;

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |_| Ok(Some(request.clone())));
        uow.rooms.expect_find_by_id().never();
        let uow = uow.build();

        let service = AllocationManager::new(uow.clone(), no_lock(), quiet_notifier());
        let err = service
            .approve(admin(), id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(
            err.to_string(),
            "Request cannot be processed: current status is allocated"
        );
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_approve_rejects_full_room_before_locking() {
        let request = sample_request(RequestStatus::Pending);
        let room = sample_room(2, 2, RoomStatus::Occupied);
        let (request_id, room_id) = (request.id, room.id);

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));
        uow.allocations
            .expect_find_active_for_user()
            .returning(|_| Ok(None));
        uow.rooms
            .expect_find_by_id()
            .with(eq(room_id))
            .returning(move |_| Ok(Some(room.clone())));
        let uow = uow.build();

        let service = AllocationManager::new(uow.clone(), no_lock(), quiet_notifier());
        let err = service
            .approve(admin(), request_id, room_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RoomUnavailable(_)));
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_approve_rejects_student_with_active_allocation() {
        let request = sample_request(RequestStatus::Waitlisted);
        let request_id = request.id;
        let user_id = request.user_id;

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));
        uow.allocations
            .expect_find_active_for_user()
            .with(eq(user_id))
            .returning(move |user_id| {
                Ok(Some(RoomAllocation {
                    id: Uuid::new_v4(),
                    user_id,
                    room_id: Uuid::new_v4(),
                    request_id: None,
                    allocated_by: None,
                    created_at: Utc::now(),
                    end_date: None,
                }))
            });
        let uow = uow.build();

        let service = AllocationManager::new(uow.clone(), no_lock(), quiet_notifier());
        let result = service.approve(admin(), request_id, Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_approve_takes_room_lock_and_runs_transaction() {
        let request = sample_request(RequestStatus::Pending);
        let room = sample_room(2, 1, RoomStatus::Available);
        let (request_id, room_id) = (request.id, room.id);

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));
        uow.allocations
            .expect_find_active_for_user()
            .returning(|_| Ok(None));
        uow.rooms
            .expect_find_by_id()
            .returning(move |_| Ok(Some(room.clone())));
        let uow = uow.build();

        let expected = format!("room:{}", room_id);
        let mut lock = MockDistributedLock::new();
        lock.expect_acquire()
            .withf(move |resource| resource == expected)
            .times(1)
            .returning(|_| Ok(LockGuard::detached()));

        let service = AllocationManager::new(uow.clone(), Arc::new(lock), quiet_notifier());
        // the test unit of work fails every transaction
        let result = service.approve(admin(), request_id, room_id).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(uow.transactions(), 1);
    }

    #[tokio::test]
    async fn test_busy_room_lock_fails_without_transaction() {
        let request = sample_request(RequestStatus::Pending);
        let room = sample_room(2, 0, RoomStatus::Available);
        let (request_id, room_id) = (request.id, room.id);

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));
        uow.allocations
            .expect_find_active_for_user()
            .returning(|_| Ok(None));
        uow.rooms
            .expect_find_by_id()
            .returning(move |_| Ok(Some(room.clone())));
        let uow = uow.build();

        let mut lock = MockDistributedLock::new();
        lock.expect_acquire()
            .returning(|_| Err(AppError::busy("Room is busy")));

        let service = AllocationManager::new(uow.clone(), Arc::new(lock), quiet_notifier());
        let result = service.approve(admin(), request_id, room_id).await;

        assert!(matches!(result, Err(AppError::Busy(_))));
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_create_request_rejects_second_open_request() {
        let user_id = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_open_for_user()
            .with(eq(user_id))
            .returning(|_| Ok(Some(sample_request(RequestStatus::Waitlisted))));
        uow.requests.expect_create().never();
        let uow = uow.build();

        let service = AllocationManager::new(uow, no_lock(), quiet_notifier());
        let err = service
            .create_request(user_id, NewRoomRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "You already have a waitlisted room request");
    }

    #[tokio::test]
    async fn test_create_request_starts_pending() {
        let user_id = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_open_for_user()
            .returning(|_| Ok(None));
        uow.allocations
            .expect_find_active_for_user()
            .returning(|_| Ok(None));
        uow.requests
            .expect_create()
            .withf(move |r| r.user_id == user_id && r.status == RequestStatus::Pending)
            .returning(|r| Ok(r));
        let uow = uow.build();

        let service = AllocationManager::new(uow, no_lock(), quiet_notifier());
        let request = service
            .create_request(
                user_id,
                NewRoomRequest {
                    preferred_room_type: Some("double".into()),
                    preferred_floor: Some(2),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(request.preferred_floor, Some(2));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_may_cancel() {
        let request = sample_request(RequestStatus::Pending);
        let id = request.id;

        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_by_id()
            .returning(move |_| Ok(Some(request.clone())));
        let uow = uow.build();

        let service = AllocationManager::new(uow.clone(), no_lock(), quiet_notifier());
        let warden = Actor::new(Uuid::new_v4(), UserRole::Warden);
        let result = service.cancel(warden, id).await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_deallocate_ended_allocation_is_rejected() {
        let id = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.allocations.expect_find_by_id().returning(move |id| {
            Ok(Some(RoomAllocation {
                id,
                user_id: Uuid::new_v4(),
                room_id: Uuid::new_v4(),
                request_id: None,
                allocated_by: None,
                created_at: Utc::now(),
                end_date: Some(Utc::now()),
            }))
        });
        let uow = uow.build();

        let service = AllocationManager::new(uow.clone(), no_lock(), quiet_notifier());
        let result = service.deallocate(admin(), id).await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert_eq!(uow.transactions(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_second_request_is_invalid_state() {
        let user_id = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.requests
            .expect_find_open_for_user()
            .returning(|_| Ok(None));
        uow.allocations
            .expect_find_active_for_user()
            .returning(|_| Ok(None));
        uow.requests
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Open room request")));
        let uow = uow.build();

        let service = AllocationManager::new(uow, no_lock(), quiet_notifier());
        let err = service
            .create_request(user_id, NewRoomRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.to_string(), "You already have an open room request");
    }

    #[tokio::test]
    async fn test_allocations_carry_room_numbers() {
        let room = sample_room(2, 1, RoomStatus::Available);
        let room_id = room.id;
        let user_id = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.allocations.expect_list_for_user().returning(move |user_id| {
            Ok(vec![RoomAllocation {
                id: Uuid::new_v4(),
                user_id,
                room_id,
                request_id: None,
                allocated_by: None,
                created_at: Utc::now(),
                end_date: None,
            }])
        });
        uow.rooms
            .expect_find_by_id()
            .with(eq(room_id))
            .returning(move |_| Ok(Some(room.clone())));
        let uow = uow.build();

        let service = AllocationManager::new(uow, no_lock(), quiet_notifier());
        let allocations = service.my_allocations(user_id).await.unwrap();

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].room_number.as_deref(), Some("101"));
        assert!(allocations[0].active);
    }
}

/// Approval and deallocation running through real repositories over a mock
/// connection. Query results are consumed in the order the service reads.
#[cfg(test)]
mod persisted_tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::{LockGuard, MockDistributedLock, Persistence};
    use crate::services::rows;
    use crate::services::MockNotifier;
    use sea_orm::DatabaseConnection;

    struct Ids {
        user: Uuid,
        request: Uuid,
        room: Uuid,
        hostel: Uuid,
        allocation: Uuid,
    }

    impl Ids {
        fn new() -> Self {
            Self {
                user: Uuid::new_v4(),
                request: Uuid::new_v4(),
                room: Uuid::new_v4(),
                hostel: Uuid::new_v4(),
                allocation: Uuid::new_v4(),
            }
        }
    }

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::Admin)
    }

    fn free_lock() -> Arc<MockDistributedLock> {
        let mut lock = MockDistributedLock::new();
        lock.expect_acquire()
            .returning(|_| Ok(LockGuard::detached()));
        Arc::new(lock)
    }

    fn notifier(times: usize) -> Arc<MockNotifier> {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(times).returning(|_| Ok(()));
        Arc::new(notifier)
    }

    fn manager(
        db: &DatabaseConnection,
        notifications: usize,
    ) -> AllocationManager<Persistence> {
        AllocationManager::new(
            Arc::new(Persistence::new(db.clone())),
            free_lock(),
            notifier(notifications),
        )
    }

    /// The statements of the last transaction, rendered for substring checks.
    fn last_transaction(db: &DatabaseConnection) -> String {
        let log = rows::statements(db);
        format!("{:?}", log.last())
    }

    fn any_insert(db: &DatabaseConnection) -> bool {
        format!("{:?}", rows::statements(db)).contains("INSERT")
    }

    /// Rows for one successful approval. `seen` is the room as the pre-check
    /// reads it, `locked` is what the transaction reads under the row lock.
    fn approval_rows(
        ids: &Ids,
        capacity: i32,
        seen: i32,
        locked: i32,
        hostel_occupancy: i32,
    ) -> sea_orm::MockDatabase {
        let full = locked + 1 >= capacity;
        let after = if full {
            RoomStatus::Occupied
        } else {
            RoomStatus::Available
        };
        rows::mock_db()
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            .append_query_results([rows::no_allocations()])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                capacity,
                seen,
                RoomStatus::Available,
            )]])
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            .append_query_results([rows::no_allocations()])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                capacity,
                locked,
                RoomStatus::Available,
            )]])
            .append_query_results([vec![rows::allocation(
                ids.allocation,
                ids.user,
                ids.room,
                None,
            )]])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                capacity,
                locked + 1,
                after,
            )]])
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Allocated,
            )]])
            .append_query_results([vec![rows::hostel(ids.hostel, 100, hostel_occupancy)]])
            .append_query_results([vec![rows::hostel(
                ids.hostel,
                100,
                hostel_occupancy + 1,
            )]])
    }

    #[tokio::test]
    async fn test_approve_writes_allocation_and_occupancy_in_one_transaction() {
        let ids = Ids::new();
        // The pre-check sees an empty room; another approval filled a bed
        // before the row lock was taken.
        let db = approval_rows(&ids, 3, 0, 1, 5).into_connection();

        let response = manager(&db, 1)
            .approve(admin(), ids.request, ids.room)
            .await
            .unwrap();

        assert_eq!(response.id, ids.allocation);
        assert_eq!(response.user_id, ids.user);
        assert_eq!(response.room_number.as_deref(), Some("101"));
        assert!(response.active);

        let tx = last_transaction(&db);
        assert!(tx.contains("FOR UPDATE"));
        assert!(tx.contains(r#"INSERT INTO \"room_allocations\""#));
        assert!(tx.contains(r#"UPDATE \"rooms\""#));
        assert!(tx.contains(r#"UPDATE \"room_requests\""#));
        assert!(tx.contains(r#"UPDATE \"hostels\""#));
        // occupied is written from the locked row (1 + 1), hostel 5 + 1
        assert!(tx.contains("Int(Some(2))"));
        assert!(tx.contains("Int(Some(6))"));
        assert!(tx.contains(r#"String(Some("allocated"))"#));
    }

    #[tokio::test]
    async fn test_second_approval_fills_double_room() {
        let first = Ids::new();
        let second = Ids {
            room: first.room,
            hostel: first.hostel,
            ..Ids::new()
        };

        let db = approval_rows(&first, 2, 0, 0, 0).into_connection();
        manager(&db, 1)
            .approve(admin(), first.request, first.room)
            .await
            .unwrap();
        let tx = last_transaction(&db);
        assert!(tx.contains(r#"String(Some("available"))"#));

        let db = approval_rows(&second, 2, 1, 1, 1).into_connection();
        let response = manager(&db, 1)
            .approve(admin(), second.request, second.room)
            .await
            .unwrap();

        assert_eq!(response.room_id, first.room);
        let tx = last_transaction(&db);
        assert!(tx.contains("Int(Some(2))"));
        assert!(tx.contains(r#"String(Some("occupied"))"#));
    }

    #[tokio::test]
    async fn test_approve_into_room_filled_after_precheck_writes_nothing() {
        let ids = Ids::new();
        let db = rows::mock_db()
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            .append_query_results([rows::no_allocations()])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                2,
                1,
                RoomStatus::Available,
            )]])
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            .append_query_results([rows::no_allocations()])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                2,
                2,
                RoomStatus::Occupied,
            )]])
            .into_connection();

        let err = manager(&db, 0)
            .approve(admin(), ids.request, ids.room)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RoomUnavailable(_)));
        assert!(!any_insert(&db));
    }

    #[tokio::test]
    async fn test_approve_rechecks_active_allocation_under_lock() {
        let ids = Ids::new();
        let db = rows::mock_db()
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            .append_query_results([rows::no_allocations()])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                2,
                0,
                RoomStatus::Available,
            )]])
            .append_query_results([vec![rows::request(
                ids.request,
                ids.user,
                RequestStatus::Pending,
            )]])
            // A concurrent approval of another request by the same student
            // committed between the pre-check and the transaction.
            .append_query_results([vec![rows::allocation(
                Uuid::new_v4(),
                ids.user,
                Uuid::new_v4(),
                None,
            )]])
            .into_connection();

        let err = manager(&db, 0)
            .approve(admin(), ids.request, ids.room)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.to_string(), "Student already has a room allocated");
        assert!(!any_insert(&db));
    }

    #[tokio::test]
    async fn test_deallocate_ends_allocation_and_frees_bed() {
        let ids = Ids::new();
        let ended = Utc::now();
        let db = rows::mock_db()
            .append_query_results([vec![rows::allocation(
                ids.allocation,
                ids.user,
                ids.room,
                None,
            )]])
            .append_query_results([vec![rows::allocation(
                ids.allocation,
                ids.user,
                ids.room,
                None,
            )]])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                2,
                2,
                RoomStatus::Occupied,
            )]])
            .append_query_results([vec![rows::allocation(
                ids.allocation,
                ids.user,
                ids.room,
                Some(ended),
            )]])
            .append_query_results([vec![rows::room(
                ids.room,
                ids.hostel,
                2,
                1,
                RoomStatus::Available,
            )]])
            .append_query_results([vec![rows::hostel(ids.hostel, 100, 9)]])
            .append_query_results([vec![rows::hostel(ids.hostel, 100, 8)]])
            .into_connection();

        let response = manager(&db, 1)
            .deallocate(admin(), ids.allocation)
            .await
            .unwrap();

        assert_eq!(response.id, ids.allocation);
        assert!(!response.active);
        assert!(response.end_date.is_some());

        let tx = last_transaction(&db);
        assert!(tx.contains("FOR UPDATE"));
        assert!(tx.contains(r#"UPDATE \"room_allocations\""#));
        assert!(tx.contains(r#"UPDATE \"rooms\""#));
        assert!(tx.contains(r#"UPDATE \"hostels\""#));
        // occupied 2 - 1, status back to available, hostel 9 - 1
        assert!(tx.contains("Int(Some(1))"));
        assert!(tx.contains(r#"String(Some("available"))"#));
        assert!(tx.contains("Int(Some(8))"));
        assert!(!tx.contains("INSERT"));
    }
}
