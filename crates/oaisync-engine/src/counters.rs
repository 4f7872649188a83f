//! Run counters.
//!
//! Value state threaded through the processing loop; there is no shared
//! mutable counter anywhere. Each processed record folds exactly one
//! [`RecordOutcome`] in; independent units of work can keep their own
//! deltas and [`merge`](RunCounters::merge) them at the end.

use serde::Serialize;

/// The counter bucket one processed record lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Updated,
    Archived,
    SkippedExisting,
    SkippedDeleted,
}

/// Per-run action counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// New logical records stored.
    pub created: u32,
    /// Records superseded by a new version.
    pub updated: u32,
    /// Records retired after source-side deletion.
    pub archived: u32,
    /// Active records skipped because the datestamp was unchanged.
    pub skipped_existing: u32,
    /// Deleted records skipped because the store never held them.
    pub skipped_deleted: u32,
}

impl RunCounters {
    /// All-zero counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record's outcome in.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Updated => self.updated += 1,
            RecordOutcome::Archived => self.archived += 1,
            RecordOutcome::SkippedExisting => self.skipped_existing += 1,
            RecordOutcome::SkippedDeleted => self.skipped_deleted += 1,
        }
    }

    /// Combine with another delta.
    pub fn merge(&mut self, other: &RunCounters) {
        self.created += other.created;
        self.updated += other.updated;
        self.archived += other.archived;
        self.skipped_existing += other.skipped_existing;
        self.skipped_deleted += other.skipped_deleted;
    }

    /// Total records that produced an outcome.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.created + self.updated + self.archived + self.skipped_existing + self.skipped_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_outcome_increments_once() {
        let mut counters = RunCounters::new();
        counters.record(RecordOutcome::Created);
        counters.record(RecordOutcome::Created);
        counters.record(RecordOutcome::Updated);
        counters.record(RecordOutcome::Archived);
        counters.record(RecordOutcome::SkippedExisting);
        counters.record(RecordOutcome::SkippedDeleted);

        assert_eq!(counters.created, 2);
        assert_eq!(counters.updated, 1);
        assert_eq!(counters.archived, 1);
        assert_eq!(counters.skipped_existing, 1);
        assert_eq!(counters.skipped_deleted, 1);
        assert_eq!(counters.total(), 6);
    }

    #[test]
    fn test_merge_adds_fieldwise() {
        let mut a = RunCounters::new();
        a.record(RecordOutcome::Created);
        a.record(RecordOutcome::SkippedExisting);

        let mut b = RunCounters::new();
        b.record(RecordOutcome::Created);
        b.record(RecordOutcome::Archived);

        a.merge(&b);
        assert_eq!(a.created, 2);
        assert_eq!(a.archived, 1);
        assert_eq!(a.skipped_existing, 1);
        assert_eq!(a.total(), 4);
    }
}
