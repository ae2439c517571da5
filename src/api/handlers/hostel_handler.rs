//! Hostel settings under `/api/admin/hostels`.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{AppJson, ValidatedJson};
use crate::api::middleware::{require_admin, require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::validation::validate_pincode;
use crate::domain::{Hostel, RoomTypeConfig};
use crate::errors::AppResult;
use crate::services::{HostelChanges, NewHostel};
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHostelRequest {
    #[validate(length(min = 1, message = "Hostel name is required"))]
    #[schema(example = "North Block")]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address_line: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(custom(function = "validate_pincode"))]
    #[schema(example = "560001")]
    pub pincode: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    #[schema(example = 50)]
    pub capacity: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    /// Defaults to single, double and triple
    pub room_types: Option<Vec<RoomTypeConfig>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateHostelRequest {
    #[validate(length(min = 1, message = "Hostel name is required"))]
    pub name: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom(function = "validate_pincode"))]
    pub pincode: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomTypesRequest {
    pub room_types: Vec<RoomTypeConfig>,
}

pub fn hostel_routes() -> Router<AppState> {
    Router::new()
        .route("/hostels", get(list_hostels).post(create_hostel))
        .route("/hostels/:id", get(get_hostel).put(update_hostel))
        .route("/hostels/:id/room-types", put(update_room_types))
        .route("/hostels/:id/room-types/reset", post(reset_room_types))
}

#[utoipa::path(
    get,
    path = "/api/admin/hostels",
    tag = "Hostels",
    responses((status = 200, description = "All hostels", body = [Hostel])),
    security(("bearer_auth" = []))
)]
pub async fn list_hostels(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Hostel>>> {
    require_staff(&user)?;
    Ok(Json(state.hostel_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/hostels/{id}",
    tag = "Hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    responses(
        (status = 200, description = "Hostel", body = Hostel),
        (status = 404, description = "Hostel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_hostel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Hostel>> {
    require_staff(&user)?;
    Ok(Json(state.hostel_service.get(id).await?))
}

/// Create a hostel
#[utoipa::path(
    post,
    path = "/api/admin/hostels",
    tag = "Hostels",
    request_body = CreateHostelRequest,
    responses(
        (status = 201, description = "Hostel created", body = Hostel),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_hostel(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateHostelRequest>,
) -> AppResult<Created<Hostel>> {
    require_admin(&user)?;
    let hostel = state
        .hostel_service
        .create(NewHostel {
            name: payload.name,
            address_line: payload.address_line,
            city: payload.city,
            state: payload.state,
            pincode: payload.pincode,
            capacity: payload.capacity,
            amenities: payload.amenities,
            rules: payload.rules,
            room_types: payload.room_types,
        })
        .await?;
    Ok(Created(hostel))
}

#[utoipa::path(
    put,
    path = "/api/admin/hostels/{id}",
    tag = "Hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    request_body = UpdateHostelRequest,
    responses(
        (status = 200, description = "Hostel updated", body = Hostel),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Hostel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_hostel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateHostelRequest>,
) -> AppResult<Json<Hostel>> {
    require_admin(&user)?;
    let hostel = state
        .hostel_service
        .update(
            id,
            HostelChanges {
                name: payload.name,
                address_line: payload.address_line,
                city: payload.city,
                state: payload.state,
                pincode: payload.pincode,
                capacity: payload.capacity,
                amenities: payload.amenities,
                rules: payload.rules,
            },
        )
        .await?;
    Ok(Json(hostel))
}

/// Replace the room type templates
#[utoipa::path(
    put,
    path = "/api/admin/hostels/{id}/room-types",
    tag = "Hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    request_body = RoomTypesRequest,
    responses(
        (status = 200, description = "Room types saved", body = Hostel),
        (status = 400, description = "Invalid room types")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_room_types(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RoomTypesRequest>,
) -> AppResult<Json<Hostel>> {
    require_admin(&user)?;
    let hostel = state
        .hostel_service
        .update_room_types(id, payload.room_types)
        .await?;
    Ok(Json(hostel))
}

/// Restore the default room types
#[utoipa::path(
    post,
    path = "/api/admin/hostels/{id}/room-types/reset",
    tag = "Hostels",
    params(("id" = Uuid, Path, description = "Hostel ID")),
    responses((status = 200, description = "Defaults restored", body = Hostel)),
    security(("bearer_auth" = []))
)]
pub async fn reset_room_types(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Hostel>> {
    require_admin(&user)?;
    Ok(Json(state.hostel_service.reset_room_types(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_pincode_is_rejected_with_form_message() {
        let request: CreateHostelRequest = serde_json::from_value(serde_json::json!({
            "name": "North Block",
            "address_line": "1 College Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "123",
            "capacity": 50
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let pincode = &errors.field_errors()["pincode"];
        assert_eq!(
            pincode[0].message.as_deref(),
            Some("Pincode must be 6 digits")
        );
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let request: CreateHostelRequest = serde_json::from_value(serde_json::json!({
            "name": "North Block",
            "address_line": "1 College Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001",
            "capacity": 0
        }))
        .unwrap();

        assert!(request.validate().unwrap_err().field_errors().contains_key("capacity"));
    }
}
