//! Complaint service.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
}

#[async_trait]
pub trait ComplaintService: Send + Sync {
    async fn create(&self, user_id: Uuid, complaint: NewComplaint) -> AppResult<Complaint>;

    async fn my_complaints(&self, user_id: Uuid) -> AppResult<Vec<Complaint>>;

    async fn list(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>>;

    async fn update_status(
        &self,
        actor: Actor,
        id: Uuid,
        status: ComplaintStatus,
    ) -> AppResult<Complaint>;
}

pub struct ComplaintManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ComplaintManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ComplaintService for ComplaintManager<U> {
    async fn create(&self, user_id: Uuid, complaint: NewComplaint) -> AppResult<Complaint> {
        let title = complaint.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title is required"));
        }

        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: complaint.description,
            category: complaint.category,
            priority: complaint.priority,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };

        let complaint = self.uow.complaints().create(complaint).await?;
        tracing::info!(complaint_id = %complaint.id, category = %complaint.category, "Complaint filed");
        Ok(complaint)
    }

    async fn my_complaints(&self, user_id: Uuid) -> AppResult<Vec<Complaint>> {
        self.uow.complaints().list_for_user(user_id).await
    }

    async fn list(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>> {
        self.uow.complaints().list(status).await
    }

    async fn update_status(
        &self,
        actor: Actor,
        id: Uuid,
        status: ComplaintStatus,
    ) -> AppResult<Complaint> {
        let mut complaint = self
            .uow
            .complaints()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        complaint.transition(status)?;

        let complaint = self.uow.complaints().update(complaint).await?;
        tracing::info!(complaint_id = %id, status = %status, by = %actor.id, "Complaint updated");
        Ok(complaint)
    }
}
