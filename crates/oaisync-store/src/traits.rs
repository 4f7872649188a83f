//! Abstract target store collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;

/// The store's current knowledge of a logical record.
///
/// At most one non-archived version is current for a native identifier at
/// any time; `Current` names it. A failed lookup is the `Err` branch of the
/// surrounding `Result`, so the decision logic can match all three outcomes
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    /// The record exists; `version_id` is its current (non-archived) version.
    Current {
        version_id: String,
        last_modified: DateTime<Utc>,
    },
    /// The store has never held this record (or every version is archived).
    Absent,
}

impl Existence {
    /// Whether the store holds a current version.
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(self, Existence::Current { .. })
    }
}

/// Operations the reconciliation engine needs from the target repository.
///
/// All mutation operations are safe to re-apply across runs: a crashed run
/// that already created a version is disarmed next run by
/// [`resolve_identifier`](Self::resolve_identifier) reporting the record as
/// current. Per-identifier mutual exclusion is the implementation's
/// responsibility.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Look up the current version of a logical record.
    async fn resolve_identifier(&self, native_id: &str) -> StoreResult<Existence>;

    /// Store the first version of a new logical record.
    ///
    /// Returns the minted version identifier.
    async fn create(
        &self,
        native_id: &str,
        content: &[u8],
        modified: DateTime<Utc>,
    ) -> StoreResult<String>;

    /// Store a new version superseding `current_version_id`.
    ///
    /// The store must verify `current_version_id` is still the current
    /// version; if it vanished or was archived since the existence check,
    /// the call fails with a consistency violation rather than silently
    /// overwriting.
    async fn update(
        &self,
        native_id: &str,
        content: &[u8],
        modified: DateTime<Utc>,
        current_version_id: &str,
    ) -> StoreResult<String>;

    /// Retire a version. Archived content remains queryable but is no
    /// longer current. Archiving twice is not an error.
    async fn archive(&self, version_id: &str) -> StoreResult<()>;

    /// The most recent modification instant across everything stored, used
    /// as the lower bound of the next harvest. `None` for an empty store.
    async fn latest_watermark(&self) -> StoreResult<Option<DateTime<Utc>>>;
}
