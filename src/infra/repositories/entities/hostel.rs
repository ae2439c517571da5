//! Hostel database entity.

use sea_orm::entity::prelude::*;

use super::string_list;
use crate::domain::hostel::parse_room_types;
use crate::domain::Hostel;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "hostels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub amenities: Json,
    pub rules: Json,
    /// JSON-encoded list of room type templates
    #[sea_orm(column_type = "Text")]
    pub room_types: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Hostel {
    fn from(model: Model) -> Self {
        Hostel {
            id: model.id,
            name: model.name,
            address_line: model.address_line,
            city: model.city,
            state: model.state,
            pincode: model.pincode,
            capacity: model.capacity,
            current_occupancy: model.current_occupancy,
            amenities: string_list(model.amenities),
            rules: string_list(model.rules),
            room_types: parse_room_types(&model.room_types),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
