//! Complaints raised by residents.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::api::extractors::{AppJson, ValidatedJson};
use crate::api::middleware::{require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus};
use crate::errors::AppResult;
use crate::services::NewComplaint;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComplaintRequest {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    #[schema(example = "Leaking tap")]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    pub category: ComplaintCategory,
    #[serde(default = "default_priority")]
    pub priority: ComplaintPriority,
}

fn default_priority() -> ComplaintPriority {
    ComplaintPriority::Medium
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintStatusRequest {
    pub status: ComplaintStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComplaintQuery {
    /// pending, in_progress or resolved
    pub status: Option<String>,
}

pub fn complaint_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_complaint).get(list_complaints))
        .route("/mine", get(my_complaints))
        .route("/:id/status", patch(update_complaint_status))
}

#[utoipa::path(
    post,
    path = "/api/complaints",
    tag = "Complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = Complaint),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_complaint(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateComplaintRequest>,
) -> AppResult<Created<Complaint>> {
    let complaint = state
        .complaint_service
        .create(
            user.id,
            NewComplaint {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                priority: payload.priority,
            },
        )
        .await?;
    Ok(Created(complaint))
}

#[utoipa::path(
    get,
    path = "/api/complaints/mine",
    tag = "Complaints",
    responses((status = 200, description = "Caller's complaints", body = [Complaint])),
    security(("bearer_auth" = []))
)]
pub async fn my_complaints(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Complaint>>> {
    Ok(Json(state.complaint_service.my_complaints(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/complaints",
    tag = "Complaints",
    params(ComplaintQuery),
    responses((status = 200, description = "All complaints", body = [Complaint])),
    security(("bearer_auth" = []))
)]
pub async fn list_complaints(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ComplaintQuery>,
) -> AppResult<Json<Vec<Complaint>>> {
    require_staff(&user)?;
    let status = parse_param::<ComplaintStatus>(query.status)?;
    Ok(Json(state.complaint_service.list(status).await?))
}

#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/status",
    tag = "Complaints",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateComplaintStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Complaint),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_complaint_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateComplaintStatusRequest>,
) -> AppResult<Json<Complaint>> {
    require_staff(&user)?;
    let complaint = state
        .complaint_service
        .update_status(user.actor(), id, payload.status)
        .await?;
    Ok(Json(complaint))
}
