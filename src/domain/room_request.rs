//! Room request entity and its lifecycle.
//!
//! ```text
//! pending ──approve──▶ allocated
//!    │  ╲
//!    │   waitlist──▶ waitlisted ──approve──▶ allocated
//!    │                   │
//!    └──cancel──▶ cancelled ◀──cancel──┘
//! ```
//!
//! `allocated` and `cancelled` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;
use crate::errors::{AppError, AppResult};

string_enum! {
    RequestStatus, "request status" {
        Pending => "pending",
        Waitlisted => "waitlisted",
        Allocated => "allocated",
        Cancelled => "cancelled",
    }
}

impl RequestStatus {
    /// Still awaiting an admin decision (may be approved or cancelled).
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Waitlisted)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Allocated)
                | (Waitlisted, Allocated)
                | (Pending, Waitlisted)
                | (Pending, Cancelled)
                | (Waitlisted, Cancelled)
        )
    }
}

/// A student's preference record awaiting admin action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferred_room_type: Option<String>,
    pub preferred_floor: Option<i32>,
    pub priority_score: i32,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomRequest {
    /// Fails with the current status unless the request can be approved.
    pub fn ensure_actionable(&self) -> AppResult<()> {
        if self.status.is_open() {
            Ok(())
        } else {
            Err(AppError::invalid_state(format!(
                "Request cannot be processed: current status is {}",
                self.status
            )))
        }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: RequestStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::invalid_state(format!(
                "Cannot change request from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_request(status: RequestStatus) -> RoomRequest {
    RoomRequest {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        preferred_room_type: Some("double".to_string()),
        preferred_floor: Some(2),
        priority_score: 0,
        notes: None,
        status,
        requested_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_requests_are_actionable() {
        assert!(sample_request(RequestStatus::Pending).ensure_actionable().is_ok());
        assert!(sample_request(RequestStatus::Waitlisted).ensure_actionable().is_ok());
    }

    #[test]
    fn test_terminal_requests_report_current_status() {
        let err = sample_request(RequestStatus::Allocated)
            .ensure_actionable()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Request cannot be processed: current status is allocated"
        );
        assert!(sample_request(RequestStatus::Cancelled).ensure_actionable().is_err());
    }

    #[test]
    fn test_allowed_transitions() {
        let mut request = sample_request(RequestStatus::Pending);
        request.transition(RequestStatus::Waitlisted).unwrap();
        request.transition(RequestStatus::Allocated).unwrap();
        assert_eq!(request.status, RequestStatus::Allocated);
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for terminal in [RequestStatus::Allocated, RequestStatus::Cancelled] {
            for next in RequestStatus::ALL {
                assert!(!terminal.can_transition_to(*next));
            }
        }
    }

    #[test]
    fn test_waitlisted_cannot_go_back_to_waitlisted() {
        let mut request = sample_request(RequestStatus::Waitlisted);
        assert!(matches!(
            request.transition(RequestStatus::Waitlisted),
            Err(AppError::InvalidState(_))
        ));
    }
}
