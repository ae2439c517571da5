//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::string_enum;

string_enum! {
    /// Role gating which dashboard and endpoints a user may reach
    UserRole, "role" {
        Admin => "admin",
        Student => "student",
        Warden => "warden",
        Parent => "parent",
        OperationsAssistant => "operations_assistant",
    }
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Staff roles may review complaints, leave requests and room requests
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::Warden | UserRole::OperationsAssistant
        )
    }

    /// Check if this role satisfies any of the required roles.
    /// Admin satisfies every requirement.
    pub fn can_access(&self, required: &[UserRole]) -> bool {
        self.is_admin() || required.contains(self)
    }
}

string_enum! {
    /// Account availability
    UserStatus, "user status" {
        Available => "available",
        Unavailable => "unavailable",
        Suspended => "suspended",
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new student account
    pub fn new(id: Uuid, email: String, password_hash: String, full_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            full_name,
            phone: None,
            role: UserRole::Student,
            status: UserStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "student@example.com")]
    pub email: String,
    #[schema(example = "Asha Rao")]
    pub full_name: String,
    #[schema(example = "9876501234")]
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}
