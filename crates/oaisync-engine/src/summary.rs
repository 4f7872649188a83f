//! Run summary and the tracking-log line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::counters::RunCounters;

/// What one reconciliation run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Correlation id for this run's log output.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Lower bound of the slice this run harvested.
    pub watermark: DateTime<Utc>,
    /// Number of `ListRecords` round-trips made.
    pub pages_fetched: u32,
    /// Action counts.
    pub counters: RunCounters,
    /// Records that failed per-record recovery (malformed entries and
    /// store call failures); left for a later run or manual retry.
    pub failed: u32,
}

impl RunSummary {
    /// Render the tracking-log line.
    ///
    /// The format is parsed downstream; field order and wording are
    /// frozen. Do not touch without also migrating every consumer.
    #[must_use]
    pub fn tracking_line(&self) -> String {
        format!(
            "{}, New Records Loaded: {}, Records Updated: {}, Records archived: {}, Deleted skipped: {}, existing skipped: {}.",
            self.finished_at.format("%Y-%m-%dT%H:%M:%S"),
            self.counters.created,
            self.counters.updated,
            self.counters.archived,
            self.counters.skipped_deleted,
            self.counters.skipped_existing,
        )
    }
}
