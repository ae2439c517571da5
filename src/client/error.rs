use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::RequestStatus;
use crate::errors::AppError;

/// Errors from the HTTP client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network, TLS, timeout or body decoding failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response; `message` is what the user sees
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The re-fetched request can no longer be approved or cancelled
    #[error("Request cannot be processed: current status is {0}")]
    NotActionable(RequestStatus),

    #[error("A submission is already in progress")]
    InFlight,

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Map a failed response to the message the server gave, either
    /// `{"message": ..}` or `{"error": {"message": ..}}`, falling back to
    /// `HTTP <status>: <statusText>`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| server_message(&v))
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Lets CLI commands report client failures through [`AppError`].
impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status: 401, .. } => AppError::Unauthorized,
            ClientError::Api { status: 403, .. } => AppError::Forbidden,
            ClientError::Api { status: 404, .. } => AppError::NotFound,
            ClientError::Api { status: 409, message } => AppError::InvalidState(message),
            ClientError::Api { message, .. } => AppError::Validation(message),
            ClientError::NotActionable(_) => AppError::InvalidState(err.to_string()),
            ClientError::InFlight => AppError::Busy(err.to_string()),
            ClientError::Request(_) | ClientError::Config(_) => AppError::Internal(err.to_string()),
        }
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_message() {
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, r#"{"message":"Room is full"}"#);
        assert_eq!(err.to_string(), "Room is full");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_nested_error_message() {
        let body = r#"{"error":{"code":"INVALID_STATE","message":"Request cannot be processed: current status is allocated"}}"#;
        let err = ClientError::from_response(StatusCode::CONFLICT, body);
        assert_eq!(
            err.to_string(),
            "Request cannot be processed: current status is allocated"
        );
    }

    #[test]
    fn test_conversion_keeps_server_message() {
        let err: AppError = ClientError::Api {
            status: 409,
            message: "Room 101 is full".into(),
        }
        .into();
        assert!(matches!(err, AppError::InvalidState(ref m) if m == "Room 101 is full"));

        let err: AppError = ClientError::NotActionable(RequestStatus::Cancelled).into();
        assert_eq!(
            err.to_string(),
            "Request cannot be processed: current status is cancelled"
        );
    }

    #[test]
    fn test_status_text_fallback() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        let err = ClientError::from_response(StatusCode::NOT_FOUND, r#"{"message":""}"#);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }
}
