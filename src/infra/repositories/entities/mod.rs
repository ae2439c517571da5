//! SeaORM entity definitions
//!
//! Database rows, kept separate from the domain models. Each module
//! converts its `Model` into the matching domain type.

pub mod complaint;
pub mod hostel;
pub mod leave_request;
pub mod notification;
pub mod payment;
pub mod room;
pub mod room_allocation;
pub mod room_request;
pub mod user;

use sea_orm::entity::prelude::Json;

use crate::errors::{AppError, AppResult};

/// Decode a JSON string-list column.
pub(crate) fn string_list(value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Encode a string list for a JSON column.
pub(crate) fn to_json_list(values: &[String]) -> Json {
    Json::from(values.to_vec())
}

/// Parse a status column, treating unknown values as corrupt data.
pub(crate) fn parse_column<T>(table: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr<Err = AppError>,
{
    value
        .parse()
        .map_err(|_| AppError::internal(format!("Unknown value '{}' in {}", value, table)))
}
