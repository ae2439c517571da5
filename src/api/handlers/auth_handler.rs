//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::validation::{
    confirm_password_error, validate_password_strength, validate_phone,
};
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::{NewAccount, TokenResponse};
use crate::types::{Created, NoContent};

/// Student registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "student@example.com")]
    pub email: String,
    /// At least 8 characters with upper case, lower case and a digit
    #[validate(custom(function = "validate_password_strength"))]
    #[schema(example = "SecurePass123", min_length = 8)]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Asha Rao")]
    pub full_name: String,
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "9876501234")]
    pub phone: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "student@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123")]
    pub password: String,
}

/// New password with its confirmation
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[schema(example = "NewSecurePass1")]
    pub password: String,
    #[schema(example = "NewSecurePass1")]
    pub confirm_password: String,
}

/// The mismatch is a cross-field rule but is reported on `confirm_password`.
impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_password_strength(&self.password) {
            errors.add("password", e);
        }
        if let Some(e) = confirm_password_error(&self.password, &self.confirm_password) {
            errors.add("confirm_password", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Authentication routes that need a signed-in user, merged at the API root
pub fn auth_session_routes() -> Router<AppState> {
    Router::new().route("/auth/reset-password", post(reset_password))
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .register(NewAccount {
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            phone: payload.phone,
        })
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account suspended")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Replace the signed-in user's password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error, reported per field"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<NoContent> {
    state
        .auth_service
        .reset_password(user.id, payload.password)
        .await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_mismatch_is_reported_on_confirm_password() {
        let request = ResetPasswordRequest {
            password: "Secret123".into(),
            confirm_password: "Secret124".into(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("confirm_password"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_reset_accepts_matching_strong_password() {
        let request = ResetPasswordRequest {
            password: "Secret123".into(),
            confirm_password: "Secret123".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_fake_phone() {
        let request = RegisterRequest {
            email: "student@example.com".into(),
            password: "Secret123".into(),
            full_name: "Asha".into(),
            phone: Some("9999999999".into()),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }
}
