//! Room service - room CRUD with room type templates.
//!
//! Edits and deletes re-read the room under a row lock inside a
//! transaction, so an approval or deallocation committing in between is
//! never overwritten with a stale occupancy.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::validation::check_room_bounds;
use crate::domain::{Room, RoomStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RoomFilter, UnitOfWork};
use crate::with_transaction;

/// Fields for a new room. Omitted capacity, price and amenities come from
/// the hostel's template for `room_type`.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub hostel_id: Uuid,
    pub room_number: String,
    pub floor: i32,
    pub room_type: String,
    pub capacity: Option<i32>,
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub room_number: Option<String>,
    pub floor: Option<i32>,
    pub room_type: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<RoomStatus>,
}

#[async_trait]
pub trait RoomService: Send + Sync {
    async fn list(&self, filter: RoomFilter) -> AppResult<Vec<Room>>;

    async fn get(&self, id: Uuid) -> AppResult<Room>;

    async fn create(&self, room: NewRoom) -> AppResult<Room>;

    async fn update(&self, id: Uuid, changes: RoomChanges) -> AppResult<Room>;

    /// Delete a room nobody occupies
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

fn check_price(price: f64) -> AppResult<()> {
    if price < 0.0 || !price.is_finite() {
        return Err(AppError::validation("Price cannot be negative"));
    }
    Ok(())
}

fn check_number(room_number: &str) -> AppResult<String> {
    let room_number = room_number.trim();
    if room_number.is_empty() {
        return Err(AppError::validation("Room number is required"));
    }
    Ok(room_number.to_string())
}

/// Admins may set available or maintenance; occupied follows occupancy.
fn apply_status(room: &mut Room, requested: Option<RoomStatus>) -> AppResult<()> {
    match requested {
        Some(RoomStatus::Occupied) => {
            return Err(AppError::validation(
                "Occupied status is set by allocations",
            ))
        }
        Some(status) => room.status = status,
        None => {}
    }
    if room.status != RoomStatus::Maintenance {
        room.status = if room.occupied >= room.capacity {
            RoomStatus::Occupied
        } else {
            RoomStatus::Available
        };
    }
    Ok(())
}

/// Apply an edit to a freshly locked room. Occupancy is never written from
/// here; capacity is checked against the locked value.
fn apply_changes(room: &mut Room, changes: RoomChanges) -> AppResult<()> {
    if let Some(room_number) = changes.room_number {
        room.room_number = check_number(&room_number)?;
    }

    let capacity = changes.capacity.unwrap_or(room.capacity);
    let floor = changes.floor.unwrap_or(room.floor);
    check_room_bounds(capacity, floor)?;
    room.ensure_capacity_fits(capacity)?;
    room.capacity = capacity;
    room.floor = floor;

    if let Some(price) = changes.price {
        check_price(price)?;
        room.price = price;
    }
    if let Some(room_type) = changes.room_type {
        room.room_type = room_type;
    }
    if let Some(amenities) = changes.amenities {
        room.amenities = amenities;
    }
    apply_status(room, changes.status)?;
    room.updated_at = Utc::now();
    Ok(())
}

pub struct RoomManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RoomManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RoomService for RoomManager<U> {
    async fn list(&self, filter: RoomFilter) -> AppResult<Vec<Room>> {
        self.uow.rooms().list(filter).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Room> {
        self.uow.rooms().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, new_room: NewRoom) -> AppResult<Room> {
        let room_number = check_number(&new_room.room_number)?;
        let hostel = self
            .uow
            .hostels()
            .find_by_id(new_room.hostel_id)
            .await?
            .ok_or_not_found()?;

        let template = hostel.room_type(&new_room.room_type);
        if template.is_none() && (new_room.capacity.is_none() || new_room.price.is_none()) {
            return Err(AppError::validation(format!(
                "Unknown room type: {}",
                new_room.room_type
            )));
        }

        let capacity = new_room
            .capacity
            .or(template.map(|t| t.capacity))
            .unwrap_or_default();
        let price = new_room
            .price
            .or(template.map(|t| t.rent_amount))
            .unwrap_or_default();
        let amenities = new_room
            .amenities
            .or_else(|| template.map(|t| t.amenities.clone()))
            .unwrap_or_default();
        let room_type = template
            .map(|t| t.room_type.clone())
            .unwrap_or(new_room.room_type);

        check_room_bounds(capacity, new_room.floor)?;
        check_price(price)?;

        if self
            .uow
            .rooms()
            .number_exists(hostel.id, &room_number)
            .await?
        {
            return Err(AppError::conflict(format!("Room {}", room_number)));
        }

        let now = Utc::now();
        let mut room = Room {
            id: Uuid::new_v4(),
            hostel_id: hostel.id,
            room_number,
            floor: new_room.floor,
            room_type,
            capacity,
            occupied: 0,
            price,
            amenities,
            status: RoomStatus::Available,
            created_at: now,
            updated_at: now,
        };
        apply_status(&mut room, new_room.status)?;

        let room = self.uow.rooms().create(room).await?;
        tracing::info!(room_id = %room.id, room_number = %room.room_number, "Room created");
        Ok(room)
    }

    async fn update(&self, id: Uuid, changes: RoomChanges) -> AppResult<Room> {
        let current = self.get(id).await?;

        if let Some(room_number) = &changes.room_number {
            let room_number = check_number(room_number)?;
            if room_number != current.room_number
                && self
                    .uow
                    .rooms()
                    .number_exists(current.hostel_id, &room_number)
                    .await?
            {
                return Err(AppError::conflict(format!("Room {}", room_number)));
            }
        }

        let room = with_transaction!(self.uow, |ctx| {
            let mut room = ctx.rooms().find_for_update(id).await?.ok_or_not_found()?;
            apply_changes(&mut room, changes)?;
            ctx.rooms().save(room).await
        })?;

        tracing::info!(room_id = %id, occupied = room.occupied, "Room updated");
        Ok(room)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        with_transaction!(self.uow, |ctx| {
            let room = ctx.rooms().find_for_update(id).await?.ok_or_not_found()?;
            if room.occupied > 0 {
                return Err(AppError::invalid_state(format!(
                    "Room {} still has {} occupant(s)",
                    room.room_number, room.occupied
                )));
            }
            ctx.rooms().delete(id).await
        })?;

        tracing::info!(room_id = %id, "Room deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::sample_room;

    #[test]
    fn test_status_follows_occupancy() {
        let mut room = sample_room(2, 2, RoomStatus::Available);
        apply_status(&mut room, None).unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);

        room.capacity = 3;
        apply_status(&mut room, None).unwrap();
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[test]
    fn test_maintenance_is_kept_and_occupied_is_not_settable() {
        let mut room = sample_room(2, 2, RoomStatus::Available);
        apply_status(&mut room, Some(RoomStatus::Maintenance)).unwrap();
        assert_eq!(room.status, RoomStatus::Maintenance);

        assert!(apply_status(&mut room, Some(RoomStatus::Occupied)).is_err());
    }

    #[test]
    fn test_changes_keep_locked_occupancy() {
        let mut room = sample_room(3, 2, RoomStatus::Available);
        apply_changes(
            &mut room,
            RoomChanges {
                capacity: Some(2),
                price: Some(4500.0),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(room.occupied, 2);
        assert_eq!(room.capacity, 2);
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(room.price, 4500.0);
    }

    #[test]
    fn test_capacity_checked_against_locked_occupancy() {
        let mut room = sample_room(3, 2, RoomStatus::Available);
        let err = apply_changes(
            &mut room,
            RoomChanges {
                capacity: Some(1),
                ..Default::default()
            },
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Capacity cannot be lower than current occupancy (2)"
        );
        assert_eq!(room.capacity, 3);
    }

    #[test]
    fn test_price_and_number_rules() {
        assert!(check_price(0.0).is_ok());
        assert!(check_price(-1.0).is_err());
        assert_eq!(check_number(" 101 ").unwrap(), "101");
        assert!(check_number("  ").is_err());
    }
}

#[cfg(test)]
mod persisted_tests {
    use super::*;
    use crate::infra::Persistence;
    use crate::services::rows;

    #[tokio::test]
    async fn test_update_writes_occupancy_read_under_lock() {
        let (room_id, hostel_id) = (Uuid::new_v4(), Uuid::new_v4());
        let db = rows::mock_db()
            .append_query_results([vec![rows::room(room_id, hostel_id, 3, 0, RoomStatus::Available)]])
            // Two approvals committed after the first read.
            .append_query_results([vec![rows::room(room_id, hostel_id, 3, 2, RoomStatus::Available)]])
            .append_query_results([vec![rows::room(room_id, hostel_id, 3, 2, RoomStatus::Available)]])
            .into_connection();
        let service = RoomManager::new(Arc::new(Persistence::new(db.clone())));

        let room = service
            .update(
                room_id,
                RoomChanges {
                    price: Some(5200.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(room.occupied, 2);

        let tx = format!("{:?}", rows::statements(&db).last());
        assert!(tx.contains("FOR UPDATE"));
        assert!(tx.contains(r#"UPDATE \"rooms\""#));
        assert!(tx.contains("Int(Some(2))"));
        assert!(tx.contains("Double(Some(5200.0))"));
    }

    #[tokio::test]
    async fn test_capacity_shrink_below_locked_occupancy_is_rejected() {
        let (room_id, hostel_id) = (Uuid::new_v4(), Uuid::new_v4());
        let db = rows::mock_db()
            .append_query_results([vec![rows::room(room_id, hostel_id, 3, 0, RoomStatus::Available)]])
            .append_query_results([vec![rows::room(room_id, hostel_id, 3, 2, RoomStatus::Available)]])
            .into_connection();
        let service = RoomManager::new(Arc::new(Persistence::new(db.clone())));

        let result = service
            .update(
                room_id,
                RoomChanges {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let log = format!("{:?}", rows::statements(&db));
        assert!(!log.contains(r#"UPDATE \"rooms\""#));
    }

    #[tokio::test]
    async fn test_delete_refuses_room_occupied_under_lock() {
        let (room_id, hostel_id) = (Uuid::new_v4(), Uuid::new_v4());
        let db = rows::mock_db()
            .append_query_results([vec![rows::room(room_id, hostel_id, 2, 1, RoomStatus::Available)]])
            .into_connection();
        let service = RoomManager::new(Arc::new(Persistence::new(db.clone())));

        let err = service.delete(room_id).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.to_string(), "Room 101 still has 1 occupant(s)");
        assert!(!format!("{:?}", rows::statements(&db)).contains("DELETE"));
    }
}
