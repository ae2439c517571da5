//! Room allocation database entity.

use sea_orm::entity::prelude::*;

use crate::domain::RoomAllocation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "room_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub request_id: Option<Uuid>,
    pub allocated_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    /// NULL while the allocation is active
    pub end_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoomAllocation {
    fn from(model: Model) -> Self {
        RoomAllocation {
            id: model.id,
            user_id: model.user_id,
            room_id: model.room_id,
            request_id: model.request_id,
            allocated_by: model.allocated_by,
            created_at: model.created_at,
            end_date: model.end_date,
        }
    }
}
