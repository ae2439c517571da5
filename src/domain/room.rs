//! Room entity and occupancy rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;
use crate::errors::{AppError, AppResult};

string_enum! {
    RoomStatus, "room status" {
        Available => "available",
        Occupied => "occupied",
        Maintenance => "maintenance",
    }
}

/// Room domain entity
///
/// Invariant: `0 <= occupied <= capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub room_number: String,
    pub floor: i32,
    pub room_type: String,
    pub capacity: i32,
    pub occupied: i32,
    pub price: f64,
    pub amenities: Vec<String>,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Open for allocation: status available and at least one free bed.
    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Available && self.occupied < self.capacity
    }

    pub fn free_beds(&self) -> i32 {
        (self.capacity - self.occupied).max(0)
    }

    /// Fails unless another occupant can be placed in this room.
    pub fn ensure_can_accept(&self) -> AppResult<()> {
        match self.status {
            RoomStatus::Maintenance => Err(AppError::room_unavailable(format!(
                "Room {} is under maintenance",
                self.room_number
            ))),
            _ if self.occupied >= self.capacity => Err(AppError::room_unavailable(format!(
                "Room {} is full",
                self.room_number
            ))),
            RoomStatus::Occupied => Err(AppError::room_unavailable(format!(
                "Room {} is not available",
                self.room_number
            ))),
            RoomStatus::Available => Ok(()),
        }
    }

    /// Place one occupant. Reaching capacity marks the room occupied.
    pub fn occupy(&mut self) -> AppResult<()> {
        self.ensure_can_accept()?;
        self.occupied += 1;
        if self.occupied >= self.capacity {
            self.status = RoomStatus::Occupied;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove one occupant. A room that was full becomes available again;
    /// maintenance is left alone.
    pub fn vacate(&mut self) -> AppResult<()> {
        if self.occupied <= 0 {
            return Err(AppError::invalid_state(format!(
                "Room {} has no occupants",
                self.room_number
            )));
        }
        self.occupied -= 1;
        if self.status == RoomStatus::Occupied {
            self.status = RoomStatus::Available;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Capacity may not drop below the current occupancy.
    pub fn ensure_capacity_fits(&self, capacity: i32) -> AppResult<()> {
        if capacity < self.occupied {
            return Err(AppError::validation(format!(
                "Capacity cannot be lower than current occupancy ({})",
                self.occupied
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_room(capacity: i32, occupied: i32, status: RoomStatus) -> Room {
    Room {
        id: Uuid::new_v4(),
        hostel_id: Uuid::new_v4(),
        room_number: "101".to_string(),
        floor: 1,
        room_type: "double".to_string(),
        capacity,
        occupied,
        price: 6000.0,
        amenities: vec![],
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability() {
        assert!(sample_room(2, 0, RoomStatus::Available).is_available());
        assert!(sample_room(2, 1, RoomStatus::Available).is_available());
        assert!(!sample_room(2, 2, RoomStatus::Available).is_available());
        assert!(!sample_room(2, 0, RoomStatus::Maintenance).is_available());
    }

    #[test]
    fn test_two_occupants_fill_a_double_and_third_is_rejected() {
        let mut room = sample_room(2, 0, RoomStatus::Available);
        room.occupy().unwrap();
        room.occupy().unwrap();

        assert_eq!(room.occupied, 2);
        assert!(room.occupied <= room.capacity);
        assert_eq!(room.status, RoomStatus::Occupied);

        let err = room.occupy().unwrap_err();
        assert!(matches!(err, AppError::RoomUnavailable(_)));
        assert_eq!(room.occupied, 2);
    }

    #[test]
    fn test_vacate_reopens_full_room() {
        let mut room = sample_room(2, 2, RoomStatus::Occupied);
        room.vacate().unwrap();
        assert_eq!(room.occupied, 1);
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[test]
    fn test_vacate_keeps_maintenance() {
        let mut room = sample_room(2, 1, RoomStatus::Maintenance);
        room.vacate().unwrap();
        assert_eq!(room.status, RoomStatus::Maintenance);
    }

    #[test]
    fn test_vacate_empty_room_fails() {
        let mut room = sample_room(2, 0, RoomStatus::Available);
        assert!(matches!(room.vacate(), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_capacity_cannot_shrink_below_occupancy() {
        let room = sample_room(3, 2, RoomStatus::Available);
        assert!(room.ensure_capacity_fits(2).is_ok());
        assert!(room.ensure_capacity_fits(1).is_err());
    }
}
