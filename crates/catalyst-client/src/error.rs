//! Catalyst API client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("join token is empty in create response for region {0}")]
    MissingJoinToken(String),

    #[error("response is missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Whether the error is worth another attempt at the transport level.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, kind: &'static str, name: &str, message: String) -> Self {
        if status == 404 {
            ClientError::NotFound {
                kind,
                name: name.to_string(),
            }
        } else {
            ClientError::Api { status, message }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_not_found() {
        let err = ClientError::from_status(404, "region", "r1", "gone".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "region not found: r1");
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = ClientError::from_status(503, "project", "p1", "unavailable".to_string());
        assert!(!err.is_not_found());
        assert!(err.is_retryable());

        let err = ClientError::from_status(409, "project", "p1", "conflict".to_string());
        assert!(!err.is_retryable());
    }
}
