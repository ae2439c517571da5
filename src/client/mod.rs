//! Typed client for the hostel API.
//!
//! Used by the `requests` CLI command. The workflow helpers re-check state
//! before submitting and never send a second submission while one is in
//! flight; the server stays authoritative for every rule.

mod api;
mod error;
mod workflow;

pub use api::{AllocationApi, ApiClient};
pub use error::ClientError;
pub use workflow::{approve_with_precheck, cancel_with_confirmation, SubmitGuard, SubmitTicket};

#[cfg(any(test, feature = "test-utils"))]
pub use api::MockAllocationApi;
