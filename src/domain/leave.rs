//! Leave request entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;
use crate::errors::{AppError, AppResult};

string_enum! {
    LeaveStatus, "leave status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> AppResult<()> {
        if end_date < start_date {
            return Err(AppError::validation("End date cannot be before start date"));
        }
        Ok(())
    }

    /// Inclusive length in days
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Decide a pending request.
    pub fn review(&mut self, decision: LeaveStatus, reviewer: Uuid) -> AppResult<()> {
        if self.status != LeaveStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Leave request is already {}",
                self.status
            )));
        }
        if decision == LeaveStatus::Pending {
            return Err(AppError::validation("Decision must be approved or rejected"));
        }
        self.status = decision;
        self.reviewed_by = Some(reviewer);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dates_must_be_ordered() {
        assert!(LeaveRequest::check_dates(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
        assert!(LeaveRequest::check_dates(date(2024, 5, 2), date(2024, 5, 1)).is_err());
    }

    #[test]
    fn test_review_only_once() {
        let mut leave = LeaveRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            reason: "Family function".into(),
            start_date: date(2024, 5, 1),
            end_date: date(2024, 5, 3),
            status: LeaveStatus::Pending,
            reviewed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(leave.days(), 3);

        let warden = Uuid::new_v4();
        leave.review(LeaveStatus::Approved, warden).unwrap();
        assert_eq!(leave.reviewed_by, Some(warden));
        assert!(matches!(
            leave.review(LeaveStatus::Rejected, warden),
            Err(AppError::InvalidState(_))
        ));
    }
}
