//! Processing client error types.

use reqwest::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Why a capability call failed.
///
/// Every failure lands in exactly one of three buckets, decided where the
/// transport is called.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The request went out but no response came back.
    #[error("Network error: No response received from server ({0})")]
    Network(String),

    /// The request could not be built.
    #[error("Request error: {0}")]
    Request(String),
}

impl ClientError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a server error from a status and the raw response body.
    ///
    /// The message is the `error` (or `detail`) field of a JSON body, the
    /// body text otherwise, or the status reason when the body is empty.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        Self::Server {
            status: status.as_u16(),
            message: server_message(status, body),
        }
    }

    /// Classify a transport error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Request(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, ClientError::Server { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_request(&self) -> bool {
        matches!(self, ClientError::Request(_))
    }

    /// Whether a retry could plausibly succeed. The client itself never
    /// retries; this is advisory for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Server { status, .. } => *status == 429 || *status >= 500,
            ClientError::Request(_) => false,
        }
    }

    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Server { .. } => "server_error",
            ClientError::Network(_) => "network_error",
            ClientError::Request(_) => "request_error",
        }
    }
}

fn server_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            match map.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_message_from_json() {
        let err = ClientError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"bad model"}"#,
        );
        assert!(err.is_server());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Server error: 500 - bad model");
    }

    #[test]
    fn test_server_error_message_from_detail() {
        let err = ClientError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"field required"}"#,
        );
        assert_eq!(err.to_string(), "Server error: 422 - field required");
    }

    #[test]
    fn test_server_error_message_from_text() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.to_string(), "Server error: 502 - upstream down");
    }

    #[test]
    fn test_server_error_empty_body_uses_reason() {
        let err = ClientError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Server error: 404 - Not Found");
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let network = ClientError::network("connection refused");
        let request = ClientError::request("missing file");

        assert!(network.is_network() && !network.is_server());
        assert!(request.is_request() && !request.is_network());
        assert_eq!(network.status(), None);
        assert!(network
            .to_string()
            .starts_with("Network error: No response received from server"));
        assert_eq!(request.to_string(), "Request error: missing file");
    }

    #[test]
    fn test_retryable_is_advisory() {
        assert!(ClientError::network("timeout").is_retryable());
        assert!(ClientError::from_response(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
        assert!(!ClientError::from_response(StatusCode::BAD_REQUEST, "").is_retryable());
        assert!(!ClientError::request("bad").is_retryable());
    }
}
