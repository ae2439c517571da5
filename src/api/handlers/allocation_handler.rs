//! Room requests and allocations.
//!
//! `/api/room-allocation` carries the request workflow, `/api/room-allocations`
//! the resulting allocations.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::api::extractors::{AppJson, ValidatedJson};
use crate::api::middleware::{require_admin, require_roles, CurrentUser};
use crate::api::AppState;
use crate::domain::{AllocationResponse, RequestStatus, Room, RoomRequest, UserRole};
use crate::errors::AppResult;
use crate::services::NewRoomRequest;
use crate::types::{Created, Paginated, PaginatedRoomRequests, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequestBody {
    #[schema(example = "double")]
    pub preferred_room_type: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Floor must be between 1 and 8"))]
    #[schema(example = 2)]
    pub preferred_floor: Option<i32>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRequestBody {
    pub room_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestQuery {
    /// pending, waitlisted, allocated or cancelled
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailableRoomsQuery {
    pub room_type: Option<String>,
    pub floor: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AllocationQuery {
    /// true for current allocations, false for ended ones
    pub active: Option<bool>,
}

/// Routes nested at `/api/room-allocation`
pub fn room_request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/mine", get(my_requests))
        .route("/requests/:id", get(get_request))
        .route("/requests/:id/approve", post(approve_request))
        .route("/requests/:id/waitlist", post(waitlist_request))
        .route("/requests/:id/cancel", post(cancel_request))
        .route("/available-rooms", get(available_rooms))
}

/// Routes nested at `/api/room-allocations`
pub fn allocation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_allocations))
        .route("/mine", get(my_allocations))
        .route("/:id/deallocate", post(deallocate))
}

/// Submit a room request
#[utoipa::path(
    post,
    path = "/api/room-allocation/requests",
    tag = "Room allocation",
    request_body = CreateRoomRequestBody,
    responses(
        (status = 201, description = "Request created", body = RoomRequest),
        (status = 409, description = "An open request or active allocation already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_request(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateRoomRequestBody>,
) -> AppResult<Created<RoomRequest>> {
    require_roles(&user, &[UserRole::Student])?;
    let request = state
        .allocation_service
        .create_request(
            user.id,
            NewRoomRequest {
                preferred_room_type: payload.preferred_room_type,
                preferred_floor: payload.preferred_floor,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Created(request))
}

/// Request queue, highest priority first then oldest
#[utoipa::path(
    get,
    path = "/api/room-allocation/requests",
    tag = "Room allocation",
    params(PaginationParams, RequestQuery),
    responses((status = 200, description = "Requests", body = PaginatedRoomRequests)),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Paginated<RoomRequest>>> {
    require_roles(&user, &[UserRole::Warden])?;
    let status = parse_param::<RequestStatus>(query.status)?;

    let (requests, total) = state
        .allocation_service
        .list_requests(status, params.clone())
        .await?;

    Ok(Json(Paginated::new(requests, params.page, params.limit(), total)))
}

#[utoipa::path(
    get,
    path = "/api/room-allocation/requests/mine",
    tag = "Room allocation",
    responses((status = 200, description = "Caller's requests", body = [RoomRequest])),
    security(("bearer_auth" = []))
)]
pub async fn my_requests(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<RoomRequest>>> {
    Ok(Json(state.allocation_service.my_requests(user.id).await?))
}

/// Fetch one request. Clients re-read this right before approving.
#[utoipa::path(
    get,
    path = "/api/room-allocation/requests/{id}",
    tag = "Room allocation",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = RoomRequest),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoomRequest>> {
    Ok(Json(
        state.allocation_service.get_request(user.actor(), id).await?,
    ))
}

/// Allocate the requester into a room
#[utoipa::path(
    post,
    path = "/api/room-allocation/requests/{id}/approve",
    tag = "Room allocation",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = ApproveRequestBody,
    responses(
        (status = 200, description = "Allocated", body = AllocationResponse),
        (status = 409, description = "Request not actionable, room unavailable or busy")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ApproveRequestBody>,
) -> AppResult<Json<AllocationResponse>> {
    require_admin(&user)?;
    let allocation = state
        .allocation_service
        .approve(user.actor(), id, payload.room_id)
        .await?;
    Ok(Json(allocation))
}

#[utoipa::path(
    post,
    path = "/api/room-allocation/requests/{id}/waitlist",
    tag = "Room allocation",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Waitlisted", body = RoomRequest),
        (status = 409, description = "Request is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn waitlist_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoomRequest>> {
    require_admin(&user)?;
    Ok(Json(
        state.allocation_service.waitlist(user.actor(), id).await?,
    ))
}

/// Cancel an open request. Admins and the requesting student only.
#[utoipa::path(
    post,
    path = "/api/room-allocation/requests/{id}/cancel",
    tag = "Room allocation",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Cancelled", body = RoomRequest),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Request already closed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoomRequest>> {
    Ok(Json(state.allocation_service.cancel(user.actor(), id).await?))
}

/// Rooms with a free bed
#[utoipa::path(
    get,
    path = "/api/room-allocation/available-rooms",
    tag = "Room allocation",
    params(AvailableRoomsQuery),
    responses((status = 200, description = "Available rooms", body = [Room])),
    security(("bearer_auth" = []))
)]
pub async fn available_rooms(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AvailableRoomsQuery>,
) -> AppResult<Json<Vec<Room>>> {
    require_roles(&user, &[UserRole::Warden])?;
    let rooms = state
        .allocation_service
        .available_rooms(query.room_type, query.floor)
        .await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/room-allocations",
    tag = "Room allocation",
    params(AllocationQuery),
    responses((status = 200, description = "Allocations", body = [AllocationResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_allocations(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AllocationQuery>,
) -> AppResult<Json<Vec<AllocationResponse>>> {
    require_roles(&user, &[UserRole::Warden])?;
    Ok(Json(
        state.allocation_service.list_allocations(query.active).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/room-allocations/mine",
    tag = "Room allocation",
    responses((status = 200, description = "Caller's allocations", body = [AllocationResponse])),
    security(("bearer_auth" = []))
)]
pub async fn my_allocations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<AllocationResponse>>> {
    Ok(Json(state.allocation_service.my_allocations(user.id).await?))
}

/// End an allocation and free the bed
#[utoipa::path(
    post,
    path = "/api/room-allocations/{id}/deallocate",
    tag = "Room allocation",
    params(("id" = Uuid, Path, description = "Allocation ID")),
    responses(
        (status = 200, description = "Deallocated", body = AllocationResponse),
        (status = 409, description = "Allocation already ended")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deallocate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AllocationResponse>> {
    require_admin(&user)?;
    Ok(Json(
        state.allocation_service.deallocate(user.actor(), id).await?,
    ))
}
