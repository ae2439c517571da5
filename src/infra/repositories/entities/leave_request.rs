//! Leave request database entity.

use sea_orm::entity::prelude::*;

use super::parse_column;
use crate::domain::LeaveRequest;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leave_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LeaveRequest {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            id: model.id,
            status: parse_column("leave_requests.status", &model.status)?,
            user_id: model.user_id,
            reason: model.reason,
            start_date: model.start_date,
            end_date: model.end_date,
            reviewed_by: model.reviewed_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
