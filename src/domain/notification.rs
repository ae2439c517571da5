//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;

string_enum! {
    NotificationKind, "notification kind" {
        RequestApproved => "request_approved",
        RequestWaitlisted => "request_waitlisted",
        RequestCancelled => "request_cancelled",
        Deallocated => "deallocated",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
