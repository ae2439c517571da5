//! Payment repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::payment::{self, ActiveModel, Entity as PaymentEntity};
use crate::domain::{Payment, PaymentStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;

    /// All payments by due date
    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;

    async fn create(&self, payment: Payment) -> AppResult<Payment>;

    async fn update(&self, payment: Payment) -> AppResult<Payment>;
}

fn active_model(payment: Payment) -> ActiveModel {
    ActiveModel {
        id: Set(payment.id),
        user_id: Set(payment.user_id),
        amount: Set(payment.amount),
        description: Set(payment.description),
        due_date: Set(payment.due_date),
        status: Set(payment.status.to_string()),
        paid_date: Set(payment.paid_date),
        reference: Set(payment.reference),
        created_at: Set(payment.created_at),
        updated_at: Set(payment.updated_at),
    }
}

pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        PaymentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Payment::try_from)
            .transpose()
    }

    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>> {
        let mut query = PaymentEntity::find().order_by_asc(payment::Column::DueDate);
        if let Some(status) = status {
            query = query.filter(payment::Column::Status.eq(status.as_str()));
        }

        let models = query.all(&self.db).await.map_err(AppError::from)?;
        models.into_iter().map(Payment::try_from).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let models = PaymentEntity::find()
            .filter(payment::Column::UserId.eq(user_id))
            .order_by_asc(payment::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(Payment::try_from).collect()
    }

    async fn create(&self, payment: Payment) -> AppResult<Payment> {
        let model = active_model(payment)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Payment::try_from(model)
    }

    async fn update(&self, payment: Payment) -> AppResult<Payment> {
        let model = active_model(payment)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Payment::try_from(model)
    }
}
