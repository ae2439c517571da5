//! Room management under `/api/admin/rooms`.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{Room, RoomStatus};
use crate::errors::AppResult;
use crate::infra::RoomFilter;
use crate::services::{NewRoom, RoomChanges};
use crate::types::{Created, NoContent};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomQuery {
    pub hostel_id: Option<Uuid>,
    /// available, occupied or maintenance
    pub status: Option<String>,
    pub floor: Option<i32>,
    pub room_type: Option<String>,
}

/// New room. Capacity, price and amenities come from the hostel's room
/// type when omitted.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    pub hostel_id: Uuid,
    #[validate(length(min = 1, max = 20, message = "Room number is required"))]
    #[schema(example = "101")]
    pub room_number: String,
    #[validate(range(min = 1, max = 8, message = "Floor must be between 1 and 8"))]
    #[schema(example = 1)]
    pub floor: i32,
    #[validate(length(min = 1, message = "Room type is required"))]
    #[schema(example = "double")]
    pub room_type: String,
    #[validate(range(min = 1, max = 10, message = "Capacity must be between 1 and 10"))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 20, message = "Room number is required"))]
    pub room_number: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Floor must be between 1 and 8"))]
    pub floor: Option<i32>,
    pub room_type: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Capacity must be between 1 and 10"))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<RoomStatus>,
}

pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:id", put(update_room).delete(delete_room))
}

#[utoipa::path(
    get,
    path = "/api/admin/rooms",
    tag = "Rooms",
    params(RoomQuery),
    responses((status = 200, description = "Rooms", body = [Room])),
    security(("bearer_auth" = []))
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RoomQuery>,
) -> AppResult<Json<Vec<Room>>> {
    require_staff(&user)?;
    let filter = RoomFilter {
        hostel_id: query.hostel_id,
        status: parse_param(query.status)?,
        floor: query.floor,
        room_type: query.room_type,
        available_only: false,
    };
    Ok(Json(state.room_service.list(filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/rooms",
    tag = "Rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Room number already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_room(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateRoomRequest>,
) -> AppResult<Created<Room>> {
    require_admin(&user)?;
    let room = state
        .room_service
        .create(NewRoom {
            hostel_id: payload.hostel_id,
            room_number: payload.room_number,
            floor: payload.floor,
            room_type: payload.room_type,
            capacity: payload.capacity,
            price: payload.price,
            amenities: payload.amenities,
            status: payload.status,
        })
        .await?;
    Ok(Created(room))
}

#[utoipa::path(
    put,
    path = "/api/admin/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Room not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_room(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoomRequest>,
) -> AppResult<Json<Room>> {
    require_admin(&user)?;
    let room = state
        .room_service
        .update(
            id,
            RoomChanges {
                room_number: payload.room_number,
                floor: payload.floor,
                room_type: payload.room_type,
                capacity: payload.capacity,
                price: payload.price,
                amenities: payload.amenities,
                status: payload.status,
            },
        )
        .await?;
    Ok(Json(room))
}

/// Delete an empty room
#[utoipa::path(
    delete,
    path = "/api/admin/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 409, description = "Room is occupied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_room(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.room_service.delete(id).await?;
    Ok(NoContent)
}
