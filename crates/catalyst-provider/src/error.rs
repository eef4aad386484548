//! Provider error types

use crate::wait::WaitError;
use catalyst_client::ClientError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a [`crate::Context`] ended
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to {op} {kind} {name}: {source}")]
    Client {
        op: &'static str,
        kind: &'static str,
        name: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to {op} {kind} {name}: {source}")]
    Context {
        op: &'static str,
        kind: &'static str,
        name: String,
        #[source]
        source: ContextError,
    },

    #[error("{kind} {name} no longer exists; refresh to remove it from state")]
    Gone { kind: &'static str, name: String },

    /// The remote object was created but the operation did not finish.
    /// `partial` is the model as far as it got, secrets included.
    #[error("{source}")]
    Incomplete {
        partial: serde_json::Value,
        source: Box<ProviderError>,
    },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("provider is not configured: {0}")]
    NotConfigured(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the underlying remote error is a not-found.
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Client { source, .. } => source.is_not_found(),
            ProviderError::Incomplete { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Whether the object vanished while being updated.
    pub fn is_gone(&self) -> bool {
        matches!(self, ProviderError::Gone { .. })
    }

    /// The context error, if the operation was cancelled or timed out.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            ProviderError::Context { source, .. } => Some(*source),
            ProviderError::Incomplete { source, .. } => source.context_error(),
            _ => None,
        }
    }

    /// Model recorded by an interrupted create, if any.
    pub fn partial_state<M: DeserializeOwned>(&self) -> Option<M> {
        match self {
            ProviderError::Incomplete { partial, .. } => {
                serde_json::from_value(partial.clone()).ok()
            }
            _ => None,
        }
    }

    /// Turn a remote not-found into [`ProviderError::Gone`].
    pub(crate) fn into_gone(self) -> Self {
        match self {
            ProviderError::Client { kind, name, source, .. } if source.is_not_found() => {
                ProviderError::Gone { kind, name }
            }
            other => other,
        }
    }

    /// Attach the model reached so far to an error.
    pub(crate) fn with_partial<M: Serialize>(self, model: &M) -> Self {
        match serde_json::to_value(model) {
            Ok(partial) => ProviderError::Incomplete {
                partial,
                source: Box::new(self),
            },
            Err(e) => {
                tracing::warn!("Unable to record partial state: {}", e);
                self
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Attach the operation and resource identity to lower-level errors.
pub(crate) trait During<T> {
    fn during(self, op: &'static str, kind: &'static str, name: &str) -> Result<T>;
}

impl<T> During<T> for std::result::Result<T, ClientError> {
    fn during(self, op: &'static str, kind: &'static str, name: &str) -> Result<T> {
        self.map_err(|source| ProviderError::Client {
            op,
            kind,
            name: name.to_string(),
            source,
        })
    }
}

/// Result of a client call raced against a context
impl<T> During<T> for std::result::Result<std::result::Result<T, ClientError>, ContextError> {
    fn during(self, op: &'static str, kind: &'static str, name: &str) -> Result<T> {
        match self {
            Ok(inner) => inner.during(op, kind, name),
            Err(source) => Err(ProviderError::Context {
                op,
                kind,
                name: name.to_string(),
                source,
            }),
        }
    }
}

impl<T> During<T> for std::result::Result<T, WaitError<ClientError>> {
    fn during(self, op: &'static str, kind: &'static str, name: &str) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(WaitError::Condition(source)) => Err::<T, _>(source).during(op, kind, name),
            Err(WaitError::Context(source)) => Err(ProviderError::Context {
                op,
                kind,
                name: name.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_looks_through_wrapping() {
        let err = Err::<(), _>(ClientError::NotFound {
            kind: "region",
            name: "r1".to_string(),
        })
        .during("read", "region", "r1");

        let err = err.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "failed to read region r1: region not found: r1"
        );
    }

    #[test]
    fn test_not_found_on_update_becomes_gone() {
        let err = Err::<(), _>(ClientError::NotFound {
            kind: "region",
            name: "r1".to_string(),
        })
        .during("update", "region", "r1")
        .unwrap_err()
        .into_gone();

        assert!(err.is_gone());
        assert_eq!(
            err.to_string(),
            "region r1 no longer exists; refresh to remove it from state"
        );

        let err = ProviderError::validation("name", "must not be empty").into_gone();
        assert!(!err.is_gone());
    }

    #[test]
    fn test_incomplete_keeps_cause_and_partial_model() {
        let cause = ProviderError::Context {
            op: "create",
            kind: "region",
            name: "r1".to_string(),
            source: ContextError::Cancelled,
        };
        let err = cause.with_partial(&serde_json::json!({ "name": "r1", "join_token": "jt" }));

        assert_eq!(err.context_error(), Some(ContextError::Cancelled));
        assert_eq!(err.to_string(), "failed to create region r1: context canceled");
        let partial: serde_json::Value = err.partial_state().unwrap();
        assert_eq!(partial["join_token"], "jt");
    }

    #[test]
    fn test_context_error_is_distinct_from_remote_errors() {
        let raced: std::result::Result<std::result::Result<(), ClientError>, ContextError> =
            Err(ContextError::DeadlineExceeded);
        let err = raced.during("create", "project", "p1").unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(err.context_error(), Some(ContextError::DeadlineExceeded));
    }
}
