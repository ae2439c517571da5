//! Repository layer - Data access abstraction
//!
//! One trait per aggregate, each with a `*Store` backed by SeaORM.
//! Writes that must happen together go through the unit of work instead.

mod allocation_repository;
mod complaint_repository;
pub(crate) mod entities;
pub(crate) mod hostel_repository;
mod leave_repository;
mod notification_repository;
mod payment_repository;
pub(crate) mod request_repository;
pub(crate) mod room_repository;
mod user_repository;

pub use allocation_repository::{AllocationRepository, AllocationStore};
pub use complaint_repository::{ComplaintRepository, ComplaintStore};
pub use hostel_repository::{HostelRepository, HostelStore};
pub use leave_repository::{LeaveRepository, LeaveStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use payment_repository::{PaymentRepository, PaymentStore};
pub use request_repository::{RoomRequestRepository, RoomRequestStore};
pub use room_repository::{RoomFilter, RoomRepository, RoomStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use allocation_repository::MockAllocationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use complaint_repository::MockComplaintRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use hostel_repository::MockHostelRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use leave_repository::MockLeaveRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use request_repository::MockRoomRequestRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use room_repository::MockRoomRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
