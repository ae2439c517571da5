//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod allocation_service;
mod auth_service;
mod complaint_service;
pub mod container;
mod dashboard_service;
mod hostel_service;
mod leave_service;
mod notification_service;
mod notifier;
mod payment_service;
mod room_service;
mod user_service;

use uuid::Uuid;

use crate::domain::UserRole;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use allocation_service::{AllocationManager, AllocationService, NewRoomRequest};
pub use auth_service::{AuthService, Authenticator, Claims, NewAccount, TokenResponse};
pub use complaint_service::{ComplaintManager, ComplaintService, NewComplaint};
pub use dashboard_service::{AdminStats, DashboardManager, DashboardService, StudentDashboard};
pub use hostel_service::{HostelChanges, HostelManager, HostelService, NewHostel};
pub use leave_service::{LeaveManager, LeaveService, NewLeave};
pub use notification_service::{NotificationManager, NotificationService};
pub use notifier::{Notifier, QueueNotifier};
pub use payment_service::{NewPayment, PaymentAction, PaymentManager, PaymentService};
pub use room_service::{NewRoom, RoomChanges, RoomManager, RoomService};
pub use user_service::{UserManager, UserService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;

/// The authenticated user on whose behalf a service call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Owners see their own records; staff see everyone's.
    pub fn can_see(&self, owner: Uuid) -> bool {
        self.id == owner || self.role.is_staff()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Unit of work over mock repositories. Transactions are counted and
    //! fail, since there is no database behind them.

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::errors::{AppError, AppResult};
    use crate::infra::*;

    #[derive(Default)]
    pub struct TestUnitOfWork {
        pub users: MockUserRepository,
        pub hostels: MockHostelRepository,
        pub rooms: MockRoomRepository,
        pub requests: MockRoomRequestRepository,
        pub allocations: MockAllocationRepository,
        pub complaints: MockComplaintRepository,
        pub leaves: MockLeaveRepository,
        pub payments: MockPaymentRepository,
        pub notifications: MockNotificationRepository,
    }

    impl TestUnitOfWork {
        pub fn build(self) -> Arc<BuiltUnitOfWork> {
            Arc::new(BuiltUnitOfWork {
                users: Arc::new(self.users),
                hostels: Arc::new(self.hostels),
                rooms: Arc::new(self.rooms),
                requests: Arc::new(self.requests),
                allocations: Arc::new(self.allocations),
                complaints: Arc::new(self.complaints),
                leaves: Arc::new(self.leaves),
                payments: Arc::new(self.payments),
                notifications: Arc::new(self.notifications),
                transactions: AtomicUsize::new(0),
            })
        }
    }

    pub struct BuiltUnitOfWork {
        users: Arc<MockUserRepository>,
        hostels: Arc<MockHostelRepository>,
        rooms: Arc<MockRoomRepository>,
        requests: Arc<MockRoomRequestRepository>,
        allocations: Arc<MockAllocationRepository>,
        complaints: Arc<MockComplaintRepository>,
        leaves: Arc<MockLeaveRepository>,
        payments: Arc<MockPaymentRepository>,
        notifications: Arc<MockNotificationRepository>,
        transactions: AtomicUsize,
    }

    impl BuiltUnitOfWork {
        /// Number of transactions started so far
        pub fn transactions(&self) -> usize {
            self.transactions.load(Ordering::SeqCst)
        }

        fn begin<T>(&self) -> AppResult<T> {
            self.transactions.fetch_add(1, Ordering::SeqCst);
            Err(AppError::internal("no database in unit tests"))
        }
    }

    #[async_trait]
    impl UnitOfWork for BuiltUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn hostels(&self) -> Arc<dyn HostelRepository> {
            self.hostels.clone()
        }

        fn rooms(&self) -> Arc<dyn RoomRepository> {
            self.rooms.clone()
        }

        fn requests(&self) -> Arc<dyn RoomRequestRepository> {
            self.requests.clone()
        }

        fn allocations(&self) -> Arc<dyn AllocationRepository> {
            self.allocations.clone()
        }

        fn complaints(&self) -> Arc<dyn ComplaintRepository> {
            self.complaints.clone()
        }

        fn leaves(&self) -> Arc<dyn LeaveRepository> {
            self.leaves.clone()
        }

        fn payments(&self) -> Arc<dyn PaymentRepository> {
            self.payments.clone()
        }

        fn notifications(&self) -> Arc<dyn NotificationRepository> {
            self.notifications.clone()
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            self.begin()
        }
    }
}

#[cfg(test)]
pub(crate) mod rows {
    //! Database rows for services running over a `MockDatabase`.

    use chrono::{DateTime, Utc};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Transaction};
    use serde_json::json;
    use uuid::Uuid;

    use crate::domain::hostel::{default_room_types, encode_room_types};
    use crate::domain::{RequestStatus, RoomStatus};
    use crate::infra::repositories::entities::{hostel, room, room_allocation, room_request};

    pub fn mock_db() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    /// Every statement issued so far, one transaction per entry.
    pub fn statements(db: &DatabaseConnection) -> Vec<Transaction> {
        db.clone().into_transaction_log()
    }

    pub fn request(id: Uuid, user_id: Uuid, status: RequestStatus) -> room_request::Model {
        room_request::Model {
            id,
            user_id,
            preferred_room_type: Some("double".to_string()),
            preferred_floor: None,
            priority_score: 0,
            notes: None,
            status: status.to_string(),
            requested_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn room(
        id: Uuid,
        hostel_id: Uuid,
        capacity: i32,
        occupied: i32,
        status: RoomStatus,
    ) -> room::Model {
        room::Model {
            id,
            hostel_id,
            room_number: "101".to_string(),
            floor: 3,
            room_type: "double".to_string(),
            capacity,
            occupied,
            price: 6000.0,
            amenities: json!(["bed"]),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn allocation(
        id: Uuid,
        user_id: Uuid,
        room_id: Uuid,
        end_date: Option<DateTime<Utc>>,
    ) -> room_allocation::Model {
        room_allocation::Model {
            id,
            user_id,
            room_id,
            request_id: None,
            allocated_by: None,
            created_at: Utc::now(),
            end_date,
        }
    }

    pub fn hostel(id: Uuid, capacity: i32, current_occupancy: i32) -> hostel::Model {
        hostel::Model {
            id,
            name: "North Block".to_string(),
            address_line: "1 College Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
            capacity,
            current_occupancy,
            amenities: json!([]),
            rules: json!([]),
            room_types: encode_room_types(&default_room_types()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn no_allocations() -> Vec<room_allocation::Model> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_visibility() {
        let owner = Uuid::new_v4();
        assert!(Actor::new(owner, UserRole::Student).can_see(owner));
        assert!(!Actor::new(Uuid::new_v4(), UserRole::Student).can_see(owner));
        assert!(!Actor::new(Uuid::new_v4(), UserRole::Parent).can_see(owner));
        assert!(Actor::new(Uuid::new_v4(), UserRole::Warden).can_see(owner));
    }
}
