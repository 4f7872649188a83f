//! `ListRecords` request parameter construction.

use chrono::{DateTime, Utc};

/// Parameters for one `ListRecords` round-trip.
///
/// The first request of a run selects by timestamp; every subsequent
/// request carries only the resumption token returned by the immediately
/// preceding call. Tokens are scoped to the run that received them; they
/// are never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRecordsRequest {
    /// Initial query: everything changed since `from`.
    Initial { from: DateTime<Utc> },
    /// Continuation of a result set.
    Resume { token: String },
}

impl ListRecordsRequest {
    /// Build the initial request of a run.
    #[must_use]
    pub fn initial(from: DateTime<Utc>) -> Self {
        ListRecordsRequest::Initial { from }
    }

    /// Build a continuation request from a resumption token.
    #[must_use]
    pub fn resume(token: impl Into<String>) -> Self {
        ListRecordsRequest::Resume {
            token: token.into(),
        }
    }

    /// Whether this is the initial (timestamp-selective) request.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        matches!(self, ListRecordsRequest::Initial { .. })
    }

    /// Render the query pairs for the HTTP request.
    ///
    /// Per the protocol, `metadataPrefix` is only legal on the initial
    /// request; a resumption request is exclusive with all other selection
    /// arguments.
    #[must_use]
    pub fn to_query_pairs(&self, metadata_prefix: &str) -> Vec<(&'static str, String)> {
        match self {
            ListRecordsRequest::Initial { from } => vec![
                ("verb", "ListRecords".to_string()),
                ("metadataPrefix", metadata_prefix.to_string()),
                ("from", from.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ],
            ListRecordsRequest::Resume { token } => vec![
                ("verb", "ListRecords".to_string()),
                ("resumptionToken", token.clone()),
            ],
        }
    }
}
