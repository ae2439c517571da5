//! Payment entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;
use crate::errors::{AppError, AppResult};

string_enum! {
    PaymentStatus, "payment status" {
        Paid => "paid",
        Pending => "pending",
        Failed => "failed",
        Refunded => "refunded",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub paid_date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Pending && self.due_date < today
    }

    /// pending → paid | failed, failed → pending (retry), paid → refunded.
    pub fn transition(&mut self, next: PaymentStatus) -> AppResult<()> {
        use PaymentStatus::*;
        let allowed = matches!(
            (self.status, next),
            (Pending, Paid) | (Pending, Failed) | (Failed, Pending) | (Paid, Refunded)
        );
        if !allowed {
            return Err(AppError::invalid_state(format!(
                "Cannot change payment from {} to {}",
                self.status, next
            )));
        }
        let now = Utc::now();
        if next == Paid {
            self.paid_date = Some(now);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
