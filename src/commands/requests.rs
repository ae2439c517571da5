//! Requests command - approve or cancel room requests through the API.
//!
//! ```bash
//! hostel-manager requests --token $TOKEN approve <REQUEST_ID> --room-id <ROOM_ID>
//! hostel-manager requests --token $TOKEN cancel <REQUEST_ID>
//! ```

use std::io::{self, BufRead, Write};

use uuid::Uuid;

use crate::cli::args::{RequestsAction, RequestsArgs};
use crate::client::{approve_with_precheck, cancel_with_confirmation, ApiClient, SubmitGuard};
use crate::config::Config;
use crate::errors::AppResult;

/// Execute the requests command
pub async fn execute(args: RequestsArgs, mut config: Config) -> AppResult<()> {
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    let client = ApiClient::from_config(&config)?.with_token(args.token);
    let guard = SubmitGuard::new();
    tracing::debug!(base_url = client.base_url(), "Using API");

    match args.action {
        RequestsAction::Approve {
            request_id,
            room_id,
        } => {
            let allocation = approve_with_precheck(&client, &guard, request_id, room_id).await?;
            println!(
                "Request {} allocated to room {}",
                request_id,
                allocation
                    .room_number
                    .unwrap_or_else(|| allocation.room_id.to_string())
            );
        }
        RequestsAction::Cancel { request_id, yes } => {
            let confirmed = yes || confirm(request_id);
            match cancel_with_confirmation(&client, &guard, request_id, || confirmed).await? {
                Some(request) => println!("Request {} is now {}", request.id, request.status),
                None => println!("Nothing changed."),
            }
        }
    }

    Ok(())
}

/// Ask on stdin; anything but y/yes declines.
fn confirm(request_id: Uuid) -> bool {
    print!("Cancel room request {request_id}? [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
