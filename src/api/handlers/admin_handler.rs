//! Admin-only user management and dashboard counters.
//!
//! Hostel and room management live in their own modules and are merged
//! into the `/api/admin` router here.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{hostel_handler::hostel_routes, parse_param, room_handler::room_routes};
use crate::api::extractors::AppJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{UserResponse, UserRole, UserStatus};
use crate::errors::AppResult;
use crate::services::AdminStats;
use crate::types::{Paginated, PaginatedUsers, PaginationParams};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// One of admin, student, warden, parent, operations_assistant
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/status", patch(update_user_status))
        .route("/users/:id/role", patch(update_user_role))
        .route("/stats", get(stats))
        .merge(hostel_routes())
        .merge(room_routes())
}

/// List users, optionally by role
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(PaginationParams, UserFilter),
    responses(
        (status = 200, description = "Users", body = PaginatedUsers),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    require_admin(&user)?;
    let role = parse_param::<UserRole>(filter.role)?;

    let (users, total) = state.user_service.list_users(role, params.clone()).await?;
    let data = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(Paginated::new(data, params.page, params.limit(), total)))
}

/// Suspend, reactivate or mark a user unavailable
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    let updated = state
        .user_service
        .set_status(user.actor(), id, payload.status)
        .await?;
    Ok(Json(updated.into()))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    let updated = state
        .user_service
        .set_role(user.actor(), id, payload.role)
        .await?;
    Ok(Json(updated.into()))
}

/// Admin dashboard counters
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses((status = 200, description = "Counters", body = AdminStats)),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<AdminStats>> {
    require_admin(&user)?;
    Ok(Json(state.dashboard_service.admin_stats().await?))
}
