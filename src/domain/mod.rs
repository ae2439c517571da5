//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and lifecycle rules for the hostel. Nothing in
//! here touches the database or HTTP.

pub mod allocation;
pub mod complaint;
pub mod hostel;
pub mod leave;
pub mod notification;
pub mod password;
pub mod payment;
pub mod room;
pub mod room_request;
pub mod user;
pub mod validation;

/// Declares a lowercase string-backed status enum with `as_str`, `Display`
/// and `FromStr` (unknown values are validation errors).
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err($crate::errors::AppError::validation(format!(
                        "Invalid {}: {}",
                        $label, other
                    ))),
                }
            }
        }
    };
}

pub(crate) use string_enum;

pub use allocation::{AllocationResponse, RoomAllocation};
pub use complaint::{Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus};
pub use hostel::{check_room_types, default_room_types, Hostel, RoomTypeConfig};
pub use leave::{LeaveRequest, LeaveStatus};
pub use notification::{Notification, NotificationKind};
pub use password::Password;
pub use payment::{Payment, PaymentStatus};
pub use room::{Room, RoomStatus};
pub use room_request::{RequestStatus, RoomRequest};
pub use user::{User, UserResponse, UserRole, UserStatus};
