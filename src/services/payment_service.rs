//! Payment service - dues and their settlement.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{Payment, PaymentStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub due_date: NaiveDate,
}

/// A settlement step on an existing payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    Pay,
    Fail,
    Refund,
    /// Put a failed payment back to pending
    Retry,
}

impl PaymentAction {
    fn target(self) -> PaymentStatus {
        match self {
            PaymentAction::Pay => PaymentStatus::Paid,
            PaymentAction::Fail => PaymentStatus::Failed,
            PaymentAction::Refund => PaymentStatus::Refunded,
            PaymentAction::Retry => PaymentStatus::Pending,
        }
    }

    /// Students may pay or retry their own dues; the rest is admin work.
    fn allowed_for(self, actor: &Actor, owner: Uuid) -> bool {
        actor.role.is_admin()
            || (actor.id == owner && matches!(self, PaymentAction::Pay | PaymentAction::Retry))
    }
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create(&self, payment: NewPayment) -> AppResult<Payment>;

    async fn my_payments(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;

    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>>;

    async fn apply(
        &self,
        actor: Actor,
        id: Uuid,
        action: PaymentAction,
        reference: Option<String>,
    ) -> AppResult<Payment>;
}

pub struct PaymentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PaymentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentManager<U> {
    async fn create(&self, payment: NewPayment) -> AppResult<Payment> {
        if !(payment.amount > 0.0 && payment.amount.is_finite()) {
            return Err(AppError::validation("Amount must be greater than zero"));
        }
        self.uow
            .users()
            .find_by_id(payment.user_id)
            .await?
            .ok_or_not_found()?;

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: payment.user_id,
            amount: payment.amount,
            description: payment.description,
            due_date: payment.due_date,
            status: PaymentStatus::Pending,
            paid_date: None,
            reference: None,
            created_at: now,
            updated_at: now,
        };

        let payment = self.uow.payments().create(payment).await?;
        tracing::info!(payment_id = %payment.id, user_id = %payment.user_id, "Payment due created");
        Ok(payment)
    }

    async fn my_payments(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        self.uow.payments().list_for_user(user_id).await
    }

    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>> {
        self.uow.payments().list(status).await
    }

    async fn apply(
        &self,
        actor: Actor,
        id: Uuid,
        action: PaymentAction,
        reference: Option<String>,
    ) -> AppResult<Payment> {
        let mut payment = self
            .uow
            .payments()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        if !action.allowed_for(&actor, payment.user_id) {
            return Err(AppError::Forbidden);
        }

        let status = action.target();
        payment.transition(status)?;
        if reference.is_some() {
            payment.reference = reference;
        }

        let payment = self.uow.payments().update(payment).await?;
        tracing::info!(payment_id = %id, status = %status, by = %actor.id, "Payment updated");
        Ok(payment)
    }
}
