//! Room allocation: the link between an occupant and a room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Room;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAllocation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub request_id: Option<Uuid>,
    pub allocated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Set on deallocation
    pub end_date: Option<DateTime<Utc>>,
}

impl RoomAllocation {
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    /// Close the allocation. Closing twice is an error.
    pub fn end(&mut self, at: DateTime<Utc>) -> AppResult<()> {
        if !self.is_active() {
            return Err(AppError::invalid_state("Allocation has already ended"));
        }
        self.end_date = Some(at);
        Ok(())
    }
}

/// Allocation with room details for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AllocationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    #[schema(example = "101")]
    pub room_number: Option<String>,
    pub floor: Option<i32>,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
}

impl AllocationResponse {
    pub fn new(allocation: RoomAllocation, room: Option<&Room>) -> Self {
        Self {
            active: allocation.is_active(),
            id: allocation.id,
            user_id: allocation.user_id,
            room_id: allocation.room_id,
            room_number: room.map(|r| r.room_number.clone()),
            floor: room.map(|r| r.floor),
            request_id: allocation.request_id,
            created_at: allocation.created_at,
            end_date: allocation.end_date,
        }
    }
}
