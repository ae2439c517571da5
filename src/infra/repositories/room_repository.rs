//! Room repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::room::{self, ActiveModel, Entity as RoomEntity};
use super::entities::to_json_list;
use crate::domain::{Room, RoomStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Optional filters for room listings
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub hostel_id: Option<Uuid>,
    pub status: Option<RoomStatus>,
    pub floor: Option<i32>,
    pub room_type: Option<String>,
    /// Only rooms that can take another occupant
    pub available_only: bool,
}

impl RoomFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(hostel_id) = self.hostel_id {
            condition = condition.add(room::Column::HostelId.eq(hostel_id));
        }
        if let Some(status) = self.status {
            condition = condition.add(room::Column::Status.eq(status.as_str()));
        }
        if let Some(floor) = self.floor {
            condition = condition.add(room::Column::Floor.eq(floor));
        }
        if let Some(room_type) = &self.room_type {
            condition = condition.add(room::Column::RoomType.eq(room_type.as_str()));
        }
        if self.available_only {
            condition = condition
                .add(room::Column::Status.eq(RoomStatus::Available.as_str()))
                .add(
                    sea_orm::sea_query::Expr::col(room::Column::Occupied)
                        .lt(sea_orm::sea_query::Expr::col(room::Column::Capacity)),
                );
        }
        condition
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>>;

    /// Rooms matching the filter, ordered by floor then room number
    async fn list(&self, filter: RoomFilter) -> AppResult<Vec<Room>>;

    async fn create(&self, room: Room) -> AppResult<Room>;

    /// Whether a room number is already taken within the hostel
    async fn number_exists(&self, hostel_id: Uuid, room_number: &str) -> AppResult<bool>;

    async fn count_by_status(&self, status: RoomStatus) -> AppResult<u64>;
}

pub(crate) fn active_model(room: Room) -> ActiveModel {
    ActiveModel {
        id: Set(room.id),
        hostel_id: Set(room.hostel_id),
        room_number: Set(room.room_number),
        floor: Set(room.floor),
        room_type: Set(room.room_type),
        capacity: Set(room.capacity),
        occupied: Set(room.occupied),
        price: Set(room.price),
        amenities: Set(to_json_list(&room.amenities)),
        status: Set(room.status.to_string()),
        created_at: Set(room.created_at),
        updated_at: Set(room.updated_at),
    }
}

/// Load a room on any connection, including an open transaction.
pub(crate) async fn find_room<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<Room>> {
    RoomEntity::find_by_id(id)
        .one(conn)
        .await
        .map_err(AppError::from)?
        .map(Room::try_from)
        .transpose()
}

pub(crate) async fn save_room<C: ConnectionTrait>(conn: &C, room: Room) -> AppResult<Room> {
    let model = active_model(room).update(conn).await.map_err(AppError::from)?;
    Room::try_from(model)
}

/// Concrete implementation of RoomRepository
pub struct RoomStore {
    db: DatabaseConnection,
}

impl RoomStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRepository for RoomStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        find_room(&self.db, id).await
    }

    async fn list(&self, filter: RoomFilter) -> AppResult<Vec<Room>> {
        let models = RoomEntity::find()
            .filter(filter.condition())
            .order_by_asc(room::Column::Floor)
            .order_by_asc(room::Column::RoomNumber)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(Room::try_from).collect()
    }

    async fn create(&self, room: Room) -> AppResult<Room> {
        let model = active_model(room)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Room::try_from(model)
    }

    async fn number_exists(&self, hostel_id: Uuid, room_number: &str) -> AppResult<bool> {
        let count = RoomEntity::find()
            .filter(room::Column::HostelId.eq(hostel_id))
            .filter(room::Column::RoomNumber.eq(room_number))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn count_by_status(&self, status: RoomStatus) -> AppResult<u64> {
        RoomEntity::find()
            .filter(room::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_available_filter_compares_occupancy_with_capacity() {
        let filter = RoomFilter {
            available_only: true,
            floor: Some(2),
            ..Default::default()
        };
        let sql = RoomEntity::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""rooms"."status" = 'available'"#));
        assert!(sql.contains(r#""occupied" < "capacity""#));
        assert!(sql.contains(r#""rooms"."floor" = 2"#));
    }
}
