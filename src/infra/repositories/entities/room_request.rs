//! Room request database entity.

use sea_orm::entity::prelude::*;

use super::parse_column;
use crate::domain::RoomRequest;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "room_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferred_room_type: Option<String>,
    pub preferred_floor: Option<i32>,
    pub priority_score: i32,
    pub notes: Option<String>,
    pub status: String,
    pub requested_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for RoomRequest {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(RoomRequest {
            id: model.id,
            status: parse_column("room_requests.status", &model.status)?,
            user_id: model.user_id,
            preferred_room_type: model.preferred_room_type,
            preferred_floor: model.preferred_floor,
            priority_score: model.priority_score,
            notes: model.notes,
            requested_at: model.requested_at,
            updated_at: model.updated_at,
        })
    }
}
