//! HTTP request handlers.

use std::str::FromStr;

use crate::errors::{AppError, AppResult};

pub mod admin_handler;
pub mod allocation_handler;
pub mod auth_handler;
pub mod complaint_handler;
pub mod dashboard_handler;
pub mod hostel_handler;
pub mod leave_handler;
pub mod notification_handler;
pub mod payment_handler;
pub mod profile_handler;
pub mod room_handler;

pub use admin_handler::admin_routes;
pub use allocation_handler::{allocation_routes, room_request_routes};
pub use auth_handler::{auth_routes, auth_session_routes};
pub use complaint_handler::complaint_routes;
pub use dashboard_handler::dashboard_routes;
pub use leave_handler::leave_routes;
pub use notification_handler::notification_routes;
pub use payment_handler::payment_routes;
pub use profile_handler::profile_routes;

/// Parse an optional query value such as `?status=pending`. Empty values
/// count as absent.
pub(crate) fn parse_param<T>(value: Option<String>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().parse())
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestStatus;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param::<RequestStatus>(Some("waitlisted".into())).unwrap(),
            Some(RequestStatus::Waitlisted)
        );
        assert_eq!(parse_param::<RequestStatus>(Some("".into())).unwrap(), None);
        assert_eq!(parse_param::<RequestStatus>(None).unwrap(), None);

        let err = parse_param::<RequestStatus>(Some("done".into())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request status: done");
    }
}
