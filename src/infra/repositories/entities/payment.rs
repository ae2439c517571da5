//! Payment database entity.

use sea_orm::entity::prelude::*;

use super::parse_column;
use crate::domain::Payment;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub due_date: Date,
    pub status: String,
    pub paid_date: Option<DateTimeUtc>,
    pub reference: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Payment {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: model.id,
            status: parse_column("payments.status", &model.status)?,
            user_id: model.user_id,
            amount: model.amount,
            description: model.description,
            due_date: model.due_date,
            paid_date: model.paid_date,
            reference: model.reference,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
