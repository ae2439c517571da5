//! Dashboard service - stat cards for the admin and student dashboards.
//!
//! Every counter is an independent query, so they are issued concurrently.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::parallel;
use crate::domain::{
    AllocationResponse, ComplaintStatus, LeaveStatus, Payment, PaymentStatus, RequestStatus,
    RoomRequest, RoomStatus, UserResponse, UserRole,
};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Admin dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AdminStats {
    pub hostels: u64,
    pub students: u64,
    pub wardens: u64,
    pub available_rooms: u64,
    pub occupied_rooms: u64,
    pub maintenance_rooms: u64,
    pub pending_requests: u64,
    pub waitlisted_requests: u64,
    pub active_allocations: u64,
    pub open_complaints: u64,
    pub pending_leaves: u64,
}

/// Everything the student dashboard shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentDashboard {
    pub profile: UserResponse,
    pub allocation: Option<AllocationResponse>,
    pub open_request: Option<RoomRequest>,
    pub pending_payments: Vec<Payment>,
    /// Sum of pending and failed dues
    pub amount_due: f64,
    pub unread_notifications: u64,
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn admin_stats(&self) -> AppResult<AdminStats>;

    async fn student(&self, user_id: Uuid) -> AppResult<StudentDashboard>;
}

pub struct DashboardManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DashboardManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardManager<U> {
    async fn admin_stats(&self) -> AppResult<AdminStats> {
        let (users, hostels, rooms, requests) = (
            self.uow.users(),
            self.uow.hostels(),
            self.uow.rooms(),
            self.uow.requests(),
        );
        let (allocations, complaints, leaves) = (
            self.uow.allocations(),
            self.uow.complaints(),
            self.uow.leaves(),
        );

        let ((hostel_count, students, wardens), (available, occupied, maintenance)) =
            parallel::join2(
                parallel::join3(
                    hostels.count(),
                    users.count_by_role(UserRole::Student),
                    users.count_by_role(UserRole::Warden),
                ),
                parallel::join3(
                    rooms.count_by_status(RoomStatus::Available),
                    rooms.count_by_status(RoomStatus::Occupied),
                    rooms.count_by_status(RoomStatus::Maintenance),
                ),
            )
            .await?;

        let (pending, waitlisted, active, (in_progress, unresolved), pending_leaves) =
            parallel::join5(
                requests.count_by_status(RequestStatus::Pending),
                requests.count_by_status(RequestStatus::Waitlisted),
                allocations.count_active(),
                parallel::join2(
                    complaints.count_by_status(ComplaintStatus::InProgress),
                    complaints.count_by_status(ComplaintStatus::Pending),
                ),
                leaves.count_by_status(LeaveStatus::Pending),
            )
            .await?;

        Ok(AdminStats {
            hostels: hostel_count,
            students,
            wardens,
            available_rooms: available,
            occupied_rooms: occupied,
            maintenance_rooms: maintenance,
            pending_requests: pending,
            waitlisted_requests: waitlisted,
            active_allocations: active,
            open_complaints: in_progress + unresolved,
            pending_leaves,
        })
    }

    async fn student(&self, user_id: Uuid) -> AppResult<StudentDashboard> {
        let (users, allocations, requests, payments, notifications) = (
            self.uow.users(),
            self.uow.allocations(),
            self.uow.requests(),
            self.uow.payments(),
            self.uow.notifications(),
        );

        let (user, allocation, open_request, all_payments, unread) = parallel::join5(
            users.find_by_id(user_id),
            allocations.find_active_for_user(user_id),
            requests.find_open_for_user(user_id),
            payments.list_for_user(user_id),
            notifications.count_unread(user_id),
        )
        .await?;
        let user = user.ok_or_not_found()?;

        let allocation = match allocation {
            Some(allocation) => {
                let room = self.uow.rooms().find_by_id(allocation.room_id).await?;
                Some(AllocationResponse::new(allocation, room.as_ref()))
            }
            None => None,
        };

        let pending_payments: Vec<Payment> = all_payments
            .into_iter()
            .filter(|p| matches!(p.status, PaymentStatus::Pending | PaymentStatus::Failed))
            .collect();
        let amount_due = pending_payments.iter().map(|p| p.amount).sum();

        Ok(StudentDashboard {
            profile: user.into(),
            allocation,
            open_request,
            pending_payments,
            amount_due,
            unread_notifications: unread,
        })
    }
}
