//! Notification database entity.

use sea_orm::entity::prelude::*;

use super::parse_column;
use crate::domain::Notification;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: model.id,
            kind: parse_column("notifications.kind", &model.kind)?,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            read: model.read,
            created_at: model.created_at,
        })
    }
}
