//! Hostel service - hostel settings and room type templates.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::validation::is_valid_pincode;
use crate::domain::{check_room_types, default_room_types, Hostel, RoomTypeConfig};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Fields for a new hostel
#[derive(Debug, Clone)]
pub struct NewHostel {
    pub name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub capacity: i32,
    pub amenities: Vec<String>,
    pub rules: Vec<String>,
    /// Defaults apply when omitted
    pub room_types: Option<Vec<RoomTypeConfig>>,
}

/// Partial hostel update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct HostelChanges {
    pub name: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub capacity: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub rules: Option<Vec<String>>,
}

#[async_trait]
pub trait HostelService: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Hostel>>;

    async fn get(&self, id: Uuid) -> AppResult<Hostel>;

    async fn create(&self, hostel: NewHostel) -> AppResult<Hostel>;

    async fn update(&self, id: Uuid, changes: HostelChanges) -> AppResult<Hostel>;

    /// Replace the room type templates
    async fn update_room_types(&self, id: Uuid, types: Vec<RoomTypeConfig>) -> AppResult<Hostel>;

    /// Restore the default room type templates
    async fn reset_room_types(&self, id: Uuid) -> AppResult<Hostel>;
}

fn check_capacity(capacity: i32, occupancy: i32) -> AppResult<()> {
    if capacity < 1 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    if capacity < occupancy {
        return Err(AppError::validation(format!(
            "Capacity cannot be lower than current occupancy ({})",
            occupancy
        )));
    }
    Ok(())
}

fn check_pincode(pincode: &str) -> AppResult<()> {
    if is_valid_pincode(pincode) {
        Ok(())
    } else {
        Err(AppError::validation(
            crate::domain::validation::PINCODE_MESSAGE,
        ))
    }
}

/// Apply an edit to a freshly locked hostel. `current_occupancy` belongs to
/// the allocation workflow and is left as read.
fn apply_changes(hostel: &mut Hostel, changes: HostelChanges) -> AppResult<()> {
    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("Hostel name is required"));
        }
        hostel.name = name.trim().to_string();
    }
    if let Some(pincode) = changes.pincode {
        check_pincode(&pincode)?;
        hostel.pincode = pincode;
    }
    if let Some(capacity) = changes.capacity {
        check_capacity(capacity, hostel.current_occupancy)?;
        hostel.capacity = capacity;
    }
    if let Some(address_line) = changes.address_line {
        hostel.address_line = address_line;
    }
    if let Some(city) = changes.city {
        hostel.city = city;
    }
    if let Some(state) = changes.state {
        hostel.state = state;
    }
    if let Some(amenities) = changes.amenities {
        hostel.amenities = amenities;
    }
    if let Some(rules) = changes.rules {
        hostel.rules = rules;
    }
    hostel.updated_at = Utc::now();
    Ok(())
}

pub struct HostelManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HostelManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn save_room_types(&self, id: Uuid, types: Vec<RoomTypeConfig>) -> AppResult<Hostel> {
        with_transaction!(self.uow, |ctx| {
            let mut hostel = ctx.hostels().find_for_update(id).await?.ok_or_not_found()?;
            hostel.room_types = types;
            hostel.updated_at = Utc::now();
            ctx.hostels().save(hostel).await
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> HostelService for HostelManager<U> {
    async fn list(&self) -> AppResult<Vec<Hostel>> {
        self.uow.hostels().list().await
    }

    async fn get(&self, id: Uuid) -> AppResult<Hostel> {
        self.uow.hostels().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, hostel: NewHostel) -> AppResult<Hostel> {
        if hostel.name.trim().is_empty() {
            return Err(AppError::validation("Hostel name is required"));
        }
        check_pincode(&hostel.pincode)?;
        check_capacity(hostel.capacity, 0)?;

        let room_types = hostel.room_types.unwrap_or_else(default_room_types);
        check_room_types(&room_types)?;

        let now = Utc::now();
        let hostel = Hostel {
            id: Uuid::new_v4(),
            name: hostel.name.trim().to_string(),
            address_line: hostel.address_line,
            city: hostel.city,
            state: hostel.state,
            pincode: hostel.pincode,
            capacity: hostel.capacity,
            current_occupancy: 0,
            amenities: hostel.amenities,
            rules: hostel.rules,
            room_types,
            created_at: now,
            updated_at: now,
        };

        let hostel = self.uow.hostels().create(hostel).await?;
        tracing::info!(hostel_id = %hostel.id, "Hostel created");
        Ok(hostel)
    }

    async fn update(&self, id: Uuid, changes: HostelChanges) -> AppResult<Hostel> {
        let hostel = with_transaction!(self.uow, |ctx| {
            let mut hostel = ctx.hostels().find_for_update(id).await?.ok_or_not_found()?;
            apply_changes(&mut hostel, changes)?;
            ctx.hostels().save(hostel).await
        })?;

        tracing::info!(hostel_id = %id, "Hostel updated");
        Ok(hostel)
    }

    async fn update_room_types(&self, id: Uuid, types: Vec<RoomTypeConfig>) -> AppResult<Hostel> {
        check_room_types(&types)?;
        self.save_room_types(id, types).await
    }

    async fn reset_room_types(&self, id: Uuid) -> AppResult<Hostel> {
        self.save_room_types(id, default_room_types()).await
    }
}
