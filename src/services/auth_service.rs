//! Authentication service - registration, login, tokens and password reset.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Real Argon2 hash verified when the email is unknown, so a miss costs
/// the same as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| Password::new("Unused-Dummy-Passw0rd").ok().map(Password::into_string));

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    /// Role of the signed-in user, used to pick the dashboard
    pub role: UserRole,
}

/// Registration input after request validation
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new student account
    async fn register(&self, account: NewAccount) -> AppResult<User>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Replace the password of a signed-in user
    async fn reset_password(&self, user_id: Uuid, password: String) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        role: user.role,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, account: NewAccount) -> AppResult<User> {
        let email = account.email.trim().to_lowercase();
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&account.password)?.into_string();
        let mut user = User::new(Uuid::new_v4(), email, password_hash, account.full_name);
        user.phone = account.phone;

        let user = self.uow.users().create(user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = email.trim().to_lowercase();
        let user = self.uow.users().find_by_email(&email).await?;

        let Some(user) = user else {
            if let Some(hash) = DUMMY_HASH.as_ref() {
                let _ = Password::from_hash(hash.clone()).verify(&password);
            }
            return Err(AppError::InvalidCredentials);
        };

        if !Password::from_hash(user.password_hash.clone()).verify(&password) {
            return Err(AppError::InvalidCredentials);
        }

        // Checked after the password so the status of an account is not
        // revealed to someone without its credentials
        if user.is_suspended() {
            tracing::warn!(user_id = %user.id, "Login attempt on suspended account");
            return Err(AppError::AccountSuspended);
        }

        generate_token(&user, &self.config)
    }

    async fn reset_password(&self, user_id: Uuid, password: String) -> AppResult<()> {
        let password_hash = Password::new(&password)?.into_string();
        self.uow.users().update_password(user_id, password_hash).await?;
        tracing::info!(user_id = %user_id, "Password reset");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        let mut user = User::new(
            Uuid::new_v4(),
            "warden@example.com".to_string(),
            "hash".to_string(),
            "Warden".to_string(),
        );
        user.role = role;
        user
    }

    #[test]
    fn test_token_round_trip_keeps_role() {
        let config = Config::for_secret("test-secret-key-for-testing-only-32chars");
        let warden = user(UserRole::Warden);

        let token = generate_token(&warden, &config).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.role, UserRole::Warden);

        let claims = verify_token_internal(&token.access_token, &config).unwrap();
        assert_eq!(claims.sub, warden.id);
        assert_eq!(claims.role, UserRole::Warden);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let config = Config::for_secret("test-secret-key-for-testing-only-32chars");
        let other = Config::for_secret("another-secret-key-for-testing-32chars!");
        let token = generate_token(&user(UserRole::Student), &config).unwrap();

        assert!(matches!(
            verify_token_internal(&token.access_token, &other),
            Err(AppError::Jwt(_))
        ));
    }

    #[tokio::test]
    async fn test_register_losing_email_race_is_conflict() {
        let mut uow = crate::services::testing::TestUnitOfWork::default();
        uow.users.expect_find_by_email().returning(|_| Ok(None));
        uow.users
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("User")));
        let auth = Authenticator::new(
            uow.build(),
            Config::for_secret("test-secret-key-for-testing-only-32chars"),
        );

        let err = auth
            .register(NewAccount {
                email: "Late@Example.com".to_string(),
                password: "Hostel@2024x".to_string(),
                full_name: "Late Student".to_string(),
                phone: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }
}
