//! User service - profiles and admin user management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::Actor;
use crate::domain::{User, UserRole, UserStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Update the caller's own name and phone
    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> AppResult<User>;

    /// Admin listing, optionally narrowed to one role
    async fn list_users(
        &self,
        role: Option<UserRole>,
        params: PaginationParams,
    ) -> AppResult<(Vec<User>, u64)>;

    async fn set_status(&self, actor: Actor, id: Uuid, status: UserStatus) -> AppResult<User>;

    async fn set_role(&self, actor: Actor, id: Uuid, role: UserRole) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> AppResult<User> {
        let full_name = full_name.map(|name| name.trim().to_string());
        if matches!(&full_name, Some(name) if name.is_empty()) {
            return Err(AppError::validation("Name cannot be empty"));
        }
        self.uow.users().update_profile(id, full_name, phone).await
    }

    async fn list_users(
        &self,
        role: Option<UserRole>,
        params: PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        self.uow.users().list(role, params).await
    }

    async fn set_status(&self, actor: Actor, id: Uuid, status: UserStatus) -> AppResult<User> {
        if actor.id == id && status != UserStatus::Available {
            return Err(AppError::validation("You cannot change your own availability"));
        }
        let user = self.uow.users().set_status(id, status).await?;
        tracing::info!(user_id = %id, status = %status, by = %actor.id, "User status changed");
        Ok(user)
    }

    async fn set_role(&self, actor: Actor, id: Uuid, role: UserRole) -> AppResult<User> {
        if actor.id == id {
            return Err(AppError::validation("You cannot change your own role"));
        }
        let user = self.uow.users().set_role(id, role).await?;
        tracing::info!(user_id = %id, role = %role, by = %actor.id, "User role changed");
        Ok(user)
    }
}
