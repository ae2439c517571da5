//! Leave requests.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_roles, require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{LeaveRequest, LeaveStatus, UserRole};
use crate::errors::AppResult;
use crate::services::NewLeave;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveRequest {
    #[validate(length(min = 1, max = 500, message = "Reason is required"))]
    #[schema(example = "Family function")]
    pub reason: String,
    #[schema(example = "2026-11-02")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-11-05")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// pending, approved or rejected
    pub status: Option<String>,
}

pub fn leave_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_leave).get(list_leaves))
        .route("/mine", get(my_leaves))
        .route("/:id/approve", post(approve_leave))
        .route("/:id/reject", post(reject_leave))
}

#[utoipa::path(
    post,
    path = "/api/leave-requests",
    tag = "Leave",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Leave requested", body = LeaveRequest),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_leave(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateLeaveRequest>,
) -> AppResult<Created<LeaveRequest>> {
    let leave = state
        .leave_service
        .create(
            user.id,
            NewLeave {
                reason: payload.reason,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;
    Ok(Created(leave))
}

#[utoipa::path(
    get,
    path = "/api/leave-requests/mine",
    tag = "Leave",
    responses((status = 200, description = "Caller's leave requests", body = [LeaveRequest])),
    security(("bearer_auth" = []))
)]
pub async fn my_leaves(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    Ok(Json(state.leave_service.my_leaves(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/leave-requests",
    tag = "Leave",
    params(LeaveQuery),
    responses((status = 200, description = "All leave requests", body = [LeaveRequest])),
    security(("bearer_auth" = []))
)]
pub async fn list_leaves(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<LeaveQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    require_staff(&user)?;
    let status = parse_param::<LeaveStatus>(query.status)?;
    Ok(Json(state.leave_service.list(status).await?))
}

#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/approve",
    tag = "Leave",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Approved", body = LeaveRequest),
        (status = 409, description = "Already reviewed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_leave(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    review(state, user, id, LeaveStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/reject",
    tag = "Leave",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Rejected", body = LeaveRequest),
        (status = 409, description = "Already reviewed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_leave(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    review(state, user, id, LeaveStatus::Rejected).await
}

async fn review(
    state: AppState,
    user: CurrentUser,
    id: Uuid,
    decision: LeaveStatus,
) -> AppResult<Json<LeaveRequest>> {
    require_roles(&user, &[UserRole::Warden])?;
    let leave = state
        .leave_service
        .review(user.actor(), id, decision)
        .await?;
    Ok(Json(leave))
}
