//! Hostel entity and room type templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::check_room_bounds;
use crate::config::MIN_ROOM_FLOOR;
use crate::errors::{AppError, AppResult};

/// A named room configuration applied when creating rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeConfig {
    #[serde(rename = "type")]
    #[schema(example = "double")]
    pub room_type: String,
    #[schema(example = 2)]
    pub capacity: i32,
    #[schema(example = 6000.0)]
    pub rent_amount: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl RoomTypeConfig {
    fn new(room_type: &str, capacity: i32, rent_amount: f64, amenities: &[&str]) -> Self {
        Self {
            room_type: room_type.to_string(),
            capacity,
            rent_amount,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The default room type configuration. Used for new hostels, for resets
/// and whenever a stored configuration cannot be read.
pub fn default_room_types() -> Vec<RoomTypeConfig> {
    vec![
        RoomTypeConfig::new("single", 1, 8000.0, &["bed", "study_table", "wardrobe"]),
        RoomTypeConfig::new("double", 2, 6000.0, &["bed", "study_table", "wardrobe"]),
        RoomTypeConfig::new("triple", 3, 4500.0, &["bed", "study_table"]),
    ]
}

/// Parse the JSON-encoded `room_types` column. Empty or malformed values
/// fall back to [`default_room_types`].
pub fn parse_room_types(raw: &str) -> Vec<RoomTypeConfig> {
    match serde_json::from_str::<Vec<RoomTypeConfig>>(raw) {
        Ok(types) if !types.is_empty() => types,
        Ok(_) => default_room_types(),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable room_types column, using defaults");
            default_room_types()
        }
    }
}

/// Room types must be non-empty, uniquely named, within room bounds and
/// carry a non-negative rent.
pub fn check_room_types(types: &[RoomTypeConfig]) -> AppResult<()> {
    if types.is_empty() {
        return Err(AppError::validation("At least one room type is required"));
    }
    for (i, t) in types.iter().enumerate() {
        if t.room_type.trim().is_empty() {
            return Err(AppError::validation("Room type name is required"));
        }
        if types[..i]
            .iter()
            .any(|other| other.room_type.eq_ignore_ascii_case(&t.room_type))
        {
            return Err(AppError::validation(format!(
                "Duplicate room type: {}",
                t.room_type
            )));
        }
        check_room_bounds(t.capacity, MIN_ROOM_FLOOR)?;
        if t.rent_amount < 0.0 {
            return Err(AppError::validation("Rent amount cannot be negative"));
        }
    }
    Ok(())
}

/// Encode room types for the `room_types` column.
pub fn encode_room_types(types: &[RoomTypeConfig]) -> String {
    serde_json::to_string(types).unwrap_or_else(|_| "[]".to_string())
}

/// Hostel domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Hostel {
    pub id: Uuid,
    pub name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub amenities: Vec<String>,
    pub rules: Vec<String>,
    pub room_types: Vec<RoomTypeConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hostel {
    /// Find a room type template by name (case-insensitive).
    pub fn room_type(&self, name: &str) -> Option<&RoomTypeConfig> {
        self.room_types
            .iter()
            .find(|t| t.room_type.eq_ignore_ascii_case(name))
    }

    pub fn vacancies(&self) -> i32 {
        (self.capacity - self.current_occupancy).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_types_round_trip_with_camel_case_keys() {
        let raw = r#"[{"type":"quad","capacity":4,"rentAmount":3500,"amenities":["fan"]}]"#;
        let types = parse_room_types(raw);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].room_type, "quad");
        assert_eq!(types[0].rent_amount, 3500.0);

        let encoded = encode_room_types(&types);
        assert!(encoded.contains("\"rentAmount\""));
        assert!(encoded.contains("\"type\":\"quad\""));
    }

    #[test]
    fn test_bad_room_types_fall_back_to_defaults() {
        assert_eq!(parse_room_types("not json"), default_room_types());
        assert_eq!(parse_room_types("[]"), default_room_types());
    }

    #[test]
    fn test_default_room_types_are_valid() {
        assert!(check_room_types(&default_room_types()).is_ok());
    }

    #[test]
    fn test_room_type_checks() {
        assert!(check_room_types(&[]).is_err());

        let mut types = default_room_types();
        types.push(RoomTypeConfig::new("Double", 2, 5000.0, &[]));
        assert!(check_room_types(&types).is_err());

        let oversized = vec![RoomTypeConfig::new("dorm", 12, 2000.0, &[])];
        assert!(check_room_types(&oversized).is_err());

        let negative = vec![RoomTypeConfig::new("single", 1, -1.0, &[])];
        assert!(check_room_types(&negative).is_err());
    }
}
