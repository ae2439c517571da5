//! Notification background job.
//!
//! Allocation workflow events are queued as jobs and stored as in-app
//! notifications by the worker.

use apalis::prelude::Data;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind};
use crate::errors::AppError;
use crate::infra::{NotificationRepository, NotificationStore};

/// Notification job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationJob {
    /// Recipient
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NotificationJob {
    pub fn request_approved(user_id: Uuid, room_number: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::RequestApproved,
            title: "Room allocated".to_string(),
            message: format!("Your room request was approved. You have been allocated room {}.", room_number),
        }
    }

    pub fn request_waitlisted(user_id: Uuid) -> Self {
        Self {
            user_id,
            kind: NotificationKind::RequestWaitlisted,
            title: "Request waitlisted".to_string(),
            message: "No matching room is free right now. Your request is on the waitlist.".to_string(),
        }
    }

    pub fn request_cancelled(user_id: Uuid) -> Self {
        Self {
            user_id,
            kind: NotificationKind::RequestCancelled,
            title: "Request cancelled".to_string(),
            message: "Your room request has been cancelled.".to_string(),
        }
    }

    pub fn deallocated(user_id: Uuid, room_number: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::Deallocated,
            title: "Room vacated".to_string(),
            message: format!("Your allocation for room {} has ended.", room_number),
        }
    }

    fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Persist the job as an unread notification for its recipient.
pub async fn notification_job_handler(
    job: NotificationJob,
    db: Data<DatabaseConnection>,
) -> Result<(), AppError> {
    tracing::info!(
        user_id = %job.user_id,
        kind = %job.kind,
        "Processing notification job"
    );

    let store = NotificationStore::new((*db).clone());
    let notification = store.create(job.into_notification()).await?;

    tracing::debug!(notification_id = %notification.id, "Notification stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approved_job_names_the_room() {
        let user_id = Uuid::new_v4();
        let job = NotificationJob::request_approved(user_id, "204");
        assert_eq!(job.kind, NotificationKind::RequestApproved);
        assert!(job.message.contains("204"));

        let notification = job.into_notification();
        assert_eq!(notification.user_id, user_id);
        assert!(!notification.read);
    }

    #[test]
    fn test_job_payload_uses_snake_case_kind() {
        let job = NotificationJob::request_waitlisted(Uuid::new_v4());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "request_waitlisted");
    }
}
