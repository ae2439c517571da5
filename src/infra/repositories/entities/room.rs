//! Room database entity.

use sea_orm::entity::prelude::*;

use super::{parse_column, string_list};
use crate::domain::Room;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub room_number: String,
    pub floor: i32,
    pub room_type: String,
    pub capacity: i32,
    pub occupied: i32,
    pub price: f64,
    pub amenities: Json,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hostel::Entity",
        from = "Column::HostelId",
        to = "super::hostel::Column::Id"
    )]
    Hostel,
}

impl Related<super::hostel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hostel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Room {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Room {
            id: model.id,
            status: parse_column("rooms.status", &model.status)?,
            hostel_id: model.hostel_id,
            room_number: model.room_number,
            floor: model.floor,
            room_type: model.room_type,
            capacity: model.capacity,
            occupied: model.occupied,
            price: model.price,
            amenities: string_list(model.amenities),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
