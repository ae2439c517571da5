//! Signed-in user's own profile.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::validation::validate_phone;
use crate::domain::UserResponse;
use crate::errors::AppResult;

/// Profile changes; omitted fields stay as they are
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "9876501234")]
    pub phone: Option<String>,
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_profile).put(update_profile))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/user-profiles/me",
    tag = "Profiles",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let profile = state.user_service.get_user(user.id).await?;
    Ok(Json(profile.into()))
}

/// Update name and phone
#[utoipa::path(
    put,
    path = "/api/user-profiles/me",
    tag = "Profiles",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let profile = state
        .user_service
        .update_profile(user.id, payload.full_name, payload.phone)
        .await?;
    Ok(Json(profile.into()))
}
