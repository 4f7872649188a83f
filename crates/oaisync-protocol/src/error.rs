//! Harvest error types.
//!
//! Two layers: [`HarvestError`] covers failures that invalidate the whole
//! fetch (transport, HTTP status, protocol-level error codes, a corrupt
//! envelope); pagination cannot safely continue past any of them.
//! [`RecordParseError`] covers a single malformed record entry inside an
//! otherwise good page; those are collected and reported per record so the
//! rest of the page still processes.

use thiserror::Error;

/// Error that invalidates a `ListRecords` fetch.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The source answered with a non-success HTTP status.
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The source answered with an OAI-PMH `<error>` other than
    /// `noRecordsMatch` (which is an empty result, not an error).
    #[error("protocol error {code}: {message}")]
    Protocol { code: String, message: String },

    /// The response envelope could not be parsed as a `ListRecords` result.
    #[error("malformed response envelope: {message}")]
    Envelope { message: String },

    /// The client configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl HarvestError {
    /// Create a network error without an underlying source.
    pub fn network(message: impl Into<String>) -> Self {
        HarvestError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error wrapping an underlying cause.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        HarvestError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an envelope error.
    pub fn envelope(message: impl Into<String>) -> Self {
        HarvestError::Envelope {
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for HarvestError {
    fn from(err: quick_xml::Error) -> Self {
        HarvestError::envelope(err.to_string())
    }
}

/// Result type for harvest operations.
pub type HarvestResult<T> = Result<T, HarvestError>;

/// A single record entry that could not be turned into a
/// [`crate::record::HarvestedRecord`].
///
/// Carries the wire identifier where one was readable so the entry can be
/// retried manually.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordParseError {
    /// The record header carried no identifier.
    #[error("record header is missing an identifier")]
    MissingIdentifier,

    /// The record header carried no datestamp.
    #[error("record {identifier} is missing a datestamp")]
    MissingDatestamp { identifier: String },

    /// The datestamp could not be parsed as a UTC instant.
    #[error("record {identifier} has unparseable datestamp {value:?}")]
    BadDatestamp { identifier: String, value: String },

    /// An active record carried no metadata payload.
    #[error("record {identifier} is active but has no metadata payload")]
    MissingPayload { identifier: String },
}

impl RecordParseError {
    /// The wire identifier of the offending entry, when one was readable.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            RecordParseError::MissingIdentifier => None,
            RecordParseError::MissingDatestamp { identifier }
            | RecordParseError::BadDatestamp { identifier, .. }
            | RecordParseError::MissingPayload { identifier } => Some(identifier),
        }
    }
}
