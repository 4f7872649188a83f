//! Target store error types.
//!
//! Transient/permanent classification follows the connector convention:
//! transient errors are worth retrying on a later run, permanent ones need
//! a configuration or data fix first. Either way a store failure is
//! recovered per record by the engine and never aborts a run.

use thiserror::Error;

/// Error from a target store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure talking to the node.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The node answered with an unexpected HTTP status.
    #[error("unexpected status {status} from {operation}")]
    UnexpectedStatus { status: u16, operation: String },

    /// The object a mutation targeted does not exist on the node.
    #[error("object not found: {version_id}")]
    NotFound { version_id: String },

    /// The node's state no longer matches what the existence check saw,
    /// e.g. the version to supersede vanished or was archived out-of-band
    /// between check and act.
    #[error("consistency violation for {native_id}: {message}")]
    Consistency { native_id: String, message: String },

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The client configuration is unusable (bad URL, unreadable cert).
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl StoreError {
    /// Whether a later run may succeed without intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Network { .. } | StoreError::UnexpectedStatus { status: 500..=599, .. }
        )
    }

    /// Create a network error wrapping an underlying cause.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a consistency violation error.
    pub fn consistency(native_id: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Consistency {
            native_id: native_id.into(),
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
