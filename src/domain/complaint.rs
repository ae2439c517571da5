//! Complaint entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;
use crate::errors::{AppError, AppResult};

string_enum! {
    ComplaintStatus, "complaint status" {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
    }
}

string_enum! {
    ComplaintCategory, "complaint category" {
        Maintenance => "maintenance",
        Cleanliness => "cleanliness",
        Food => "food",
        Security => "security",
        Other => "other",
    }
}

string_enum! {
    ComplaintPriority, "complaint priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Complaint {
    /// Work only moves forward: pending → in_progress → resolved.
    pub fn transition(&mut self, next: ComplaintStatus) -> AppResult<()> {
        use ComplaintStatus::*;
        let allowed = matches!(
            (self.status, next),
            (Pending, InProgress) | (Pending, Resolved) | (InProgress, Resolved)
        );
        if !allowed {
            return Err(AppError::invalid_state(format!(
                "Cannot change complaint from {} to {}",
                self.status, next
            )));
        }
        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        if next == Resolved {
            self.resolved_at = Some(now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint(status: ComplaintStatus) -> Complaint {
        Complaint {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Leaking tap".into(),
            description: "Bathroom tap on floor 2".into(),
            category: ComplaintCategory::Maintenance,
            priority: ComplaintPriority::Medium,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_resolve_stamps_time() {
        let mut c = complaint(ComplaintStatus::Pending);
        c.transition(ComplaintStatus::InProgress).unwrap();
        assert!(c.resolved_at.is_none());
        c.transition(ComplaintStatus::Resolved).unwrap();
        assert!(c.resolved_at.is_some());
    }

    #[test]
    fn test_resolved_is_final() {
        let mut c = complaint(ComplaintStatus::Resolved);
        assert!(c.transition(ComplaintStatus::Pending).is_err());
        assert!(c.transition(ComplaintStatus::InProgress).is_err());
    }
}
