//! Hostel repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::hostel::{self, ActiveModel, Entity as HostelEntity};
use super::entities::to_json_list;
use crate::domain::hostel::encode_room_types;
use crate::domain::Hostel;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HostelRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hostel>>;

    /// All hostels, by name
    async fn list(&self) -> AppResult<Vec<Hostel>>;

    async fn create(&self, hostel: Hostel) -> AppResult<Hostel>;

    async fn count(&self) -> AppResult<u64>;
}

pub(crate) fn active_model(hostel: Hostel) -> ActiveModel {
    ActiveModel {
        id: Set(hostel.id),
        name: Set(hostel.name),
        address_line: Set(hostel.address_line),
        city: Set(hostel.city),
        state: Set(hostel.state),
        pincode: Set(hostel.pincode),
        capacity: Set(hostel.capacity),
        current_occupancy: Set(hostel.current_occupancy),
        amenities: Set(to_json_list(&hostel.amenities)),
        rules: Set(to_json_list(&hostel.rules)),
        room_types: Set(encode_room_types(&hostel.room_types)),
        created_at: Set(hostel.created_at),
        updated_at: Set(hostel.updated_at),
    }
}

pub(crate) async fn save_hostel<C: ConnectionTrait>(conn: &C, hostel: Hostel) -> AppResult<Hostel> {
    let model = active_model(hostel)
        .update(conn)
        .await
        .map_err(AppError::from)?;
    Ok(Hostel::from(model))
}

/// Concrete implementation of HostelRepository
pub struct HostelStore {
    db: DatabaseConnection,
}

impl HostelStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HostelRepository for HostelStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hostel>> {
        let result = HostelEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Hostel::from))
    }

    async fn list(&self) -> AppResult<Vec<Hostel>> {
        let models = HostelEntity::find()
            .order_by_asc(hostel::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Hostel::from).collect())
    }

    async fn create(&self, hostel: Hostel) -> AppResult<Hostel> {
        let model = active_model(hostel)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Hostel::from(model))
    }

    async fn count(&self) -> AppResult<u64> {
        HostelEntity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
