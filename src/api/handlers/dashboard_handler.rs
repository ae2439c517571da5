//! Student dashboard summary.

use axum::{extract::State, response::Json, routing::get, Router};

use crate::api::middleware::{require_roles, CurrentUser};
use crate::api::AppState;
use crate::domain::UserRole;
use crate::errors::AppResult;
use crate::services::StudentDashboard;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/student", get(student_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/student",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Allocation, open request, dues and unread count", body = StudentDashboard),
        (status = 403, description = "Students only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn student_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<StudentDashboard>> {
    require_roles(&user, &[UserRole::Student])?;
    Ok(Json(state.dashboard_service.student(user.id).await?))
}
