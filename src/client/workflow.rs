//! Approve and cancel flows as an operator drives them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::{AllocationApi, ClientError};
use crate::domain::{AllocationResponse, RoomRequest};

/// Single-flight flag for one submit control. While a [`SubmitTicket`] is
/// alive every other `begin` fails with [`ClientError::InFlight`].
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    busy: Arc<AtomicBool>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Result<SubmitTicket, ClientError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::InFlight)?;
        Ok(SubmitTicket {
            busy: self.busy.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped.
#[derive(Debug)]
pub struct SubmitTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Re-read the request and approve it only if it is still pending or
/// waitlisted. The server repeats the check; this one saves a round trip
/// when another operator got there first.
pub async fn approve_with_precheck<A>(
    api: &A,
    guard: &SubmitGuard,
    request_id: Uuid,
    room_id: Uuid,
) -> Result<AllocationResponse, ClientError>
where
    A: AllocationApi + ?Sized,
{
    let _ticket = guard.begin()?;

    let current = api.get_request(request_id).await?;
    if !current.status.is_open() {
        tracing::info!(request_id = %request_id, status = %current.status, "Request no longer actionable");
        return Err(ClientError::NotActionable(current.status));
    }

    let allocation = api.approve(request_id, room_id).await?;
    tracing::info!(request_id = %request_id, room_id = %room_id, "Request approved");
    Ok(allocation)
}

/// Ask `confirm` before cancelling. Returns `Ok(None)` when the user
/// declines, in which case nothing is sent.
pub async fn cancel_with_confirmation<A, F>(
    api: &A,
    guard: &SubmitGuard,
    request_id: Uuid,
    confirm: F,
) -> Result<Option<RoomRequest>, ClientError>
where
    A: AllocationApi + ?Sized,
    F: FnOnce() -> bool,
{
    if !confirm() {
        tracing::debug!(request_id = %request_id, "Cancellation declined");
        return Ok(None);
    }

    let _ticket = guard.begin()?;
    let cancelled = api.cancel(request_id).await?;
    tracing::info!(request_id = %request_id, "Request cancelled");
    Ok(Some(cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAllocationApi;
    use crate::domain::room_request::sample_request;
    use crate::domain::RequestStatus;
    use chrono::Utc;

    fn allocation(request: &RoomRequest, room_id: Uuid) -> AllocationResponse {
        AllocationResponse {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            room_id,
            room_number: Some("101".into()),
            floor: Some(1),
            request_id: Some(request.id),
            created_at: Utc::now(),
            end_date: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_precheck_short_circuits_on_terminal_status() {
        let request = sample_request(RequestStatus::Allocated);
        let id = request.id;

        let mut api = MockAllocationApi::new();
        api.expect_get_request()
            .times(1)
            .returning(move |_| Ok(request.clone()));
        api.expect_approve().never();

        let err = approve_with_precheck(&api, &SubmitGuard::new(), id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NotActionable(RequestStatus::Allocated)));
        assert_eq!(
            err.to_string(),
            "Request cannot be processed: current status is allocated"
        );
    }

    #[tokio::test]
    async fn test_precheck_approves_waitlisted_request() {
        let request = sample_request(RequestStatus::Waitlisted);
        let id = request.id;
        let room_id = Uuid::new_v4();
        let expected = allocation(&request, room_id);

        let mut api = MockAllocationApi::new();
        api.expect_get_request()
            .returning(move |_| Ok(request.clone()));
        api.expect_approve()
            .withf(move |r, room| *r == id && *room == room_id)
            .times(1)
            .returning(move |_, _| Ok(expected.clone()));

        let guard = SubmitGuard::new();
        let allocation = approve_with_precheck(&api, &guard, id, room_id).await.unwrap();
        assert_eq!(allocation.room_id, room_id);
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn test_server_rejection_surfaces_its_message() {
        let request = sample_request(RequestStatus::Pending);
        let id = request.id;

        let mut api = MockAllocationApi::new();
        api.expect_get_request()
            .returning(move |_| Ok(request.clone()));
        api.expect_approve().returning(|_, _| {
            Err(ClientError::Api {
                status: 409,
                message: "Room 101 is full".into(),
            })
        });

        let guard = SubmitGuard::new();
        let err = approve_with_precheck(&api, &guard, id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Room 101 is full");
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn test_second_submission_while_in_flight_is_rejected() {
        let mut api = MockAllocationApi::new();
        api.expect_get_request().never();
        api.expect_approve().never();

        let guard = SubmitGuard::new();
        let _held = guard.begin().unwrap();

        let err = approve_with_precheck(&api, &guard, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InFlight));
    }

    #[tokio::test]
    async fn test_declined_cancel_sends_nothing() {
        let mut api = MockAllocationApi::new();
        api.expect_cancel().never();

        let result = cancel_with_confirmation(&api, &SubmitGuard::new(), Uuid::new_v4(), || false)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_confirmed_cancel_calls_api() {
        let request = sample_request(RequestStatus::Cancelled);
        let id = request.id;

        let mut api = MockAllocationApi::new();
        api.expect_cancel()
            .withf(move |r| *r == id)
            .times(1)
            .returning(move |_| Ok(request.clone()));

        let cancelled = cancel_with_confirmation(&api, &SubmitGuard::new(), id, || true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
    }

    #[test]
    fn test_ticket_releases_on_drop() {
        let guard = SubmitGuard::new();
        {
            let _ticket = guard.begin().unwrap();
            assert!(guard.is_busy());
            assert!(matches!(guard.begin(), Err(ClientError::InFlight)));
        }
        assert!(!guard.is_busy());
        assert!(guard.begin().is_ok());
    }
}
