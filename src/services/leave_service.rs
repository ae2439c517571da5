//! Leave request service.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{LeaveRequest, LeaveStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[async_trait]
pub trait LeaveService: Send + Sync {
    async fn create(&self, user_id: Uuid, leave: NewLeave) -> AppResult<LeaveRequest>;

    async fn my_leaves(&self, user_id: Uuid) -> AppResult<Vec<LeaveRequest>>;

    async fn list(&self, status: Option<LeaveStatus>) -> AppResult<Vec<LeaveRequest>>;

    /// Approve or reject a pending request
    async fn review(&self, actor: Actor, id: Uuid, decision: LeaveStatus)
        -> AppResult<LeaveRequest>;
}

pub struct LeaveManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> LeaveManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> LeaveService for LeaveManager<U> {
    async fn create(&self, user_id: Uuid, leave: NewLeave) -> AppResult<LeaveRequest> {
        let reason = leave.reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("Reason is required"));
        }
        LeaveRequest::check_dates(leave.start_date, leave.end_date)?;

        let now = Utc::now();
        let leave = LeaveRequest {
            id: Uuid::new_v4(),
            user_id,
            reason: reason.to_string(),
            start_date: leave.start_date,
            end_date: leave.end_date,
            status: LeaveStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };

        let leave = self.uow.leaves().create(leave).await?;
        tracing::info!(leave_id = %leave.id, days = leave.days(), "Leave requested");
        Ok(leave)
    }

    async fn my_leaves(&self, user_id: Uuid) -> AppResult<Vec<LeaveRequest>> {
        self.uow.leaves().list_for_user(user_id).await
    }

    async fn list(&self, status: Option<LeaveStatus>) -> AppResult<Vec<LeaveRequest>> {
        self.uow.leaves().list(status).await
    }

    async fn review(
        &self,
        actor: Actor,
        id: Uuid,
        decision: LeaveStatus,
    ) -> AppResult<LeaveRequest> {
        let mut leave = self.uow.leaves().find_by_id(id).await?.ok_or_not_found()?;
        if leave.user_id == actor.id {
            return Err(AppError::Forbidden);
        }
        leave.review(decision, actor.id)?;

        let leave = self.uow.leaves().update(leave).await?;
        tracing::info!(leave_id = %id, decision = %decision, by = %actor.id, "Leave reviewed");
        Ok(leave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::TestUnitOfWork;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() {
        let mut uow = TestUnitOfWork::default();
        uow.leaves.expect_create().never();
        let service = LeaveManager::new(uow.build());

        let result = service
            .create(
                Uuid::new_v4(),
                NewLeave {
                    reason: "Exam at home town".into(),
                    start_date: date(10),
                    end_date: date(8),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_new_leave_is_pending() {
        let mut uow = TestUnitOfWork::default();
        uow.leaves.expect_create().returning(|leave| Ok(leave));
        let service = LeaveManager::new(uow.build());

        let leave = service
            .create(
                Uuid::new_v4(),
                NewLeave {
                    reason: " Sister's wedding ".into(),
                    start_date: date(1),
                    end_date: date(4),
                },
            )
            .await
            .unwrap();

        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.reason, "Sister's wedding");
        assert_eq!(leave.days(), 4);
    }
}
