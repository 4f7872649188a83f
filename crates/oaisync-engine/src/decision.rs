//! Per-record decision machine.
//!
//! Maps a harvested record plus the store's current knowledge of it onto
//! exactly one action. Pure and total: every (status, existence) pair has
//! one answer, and the only change-detection signal is datestamp equality:
//! content bytes are never diffed, so a source that republishes a record
//! under an unchanged datestamp reads as "no change" even when the bytes
//! differ. That is a documented property of the protocol contract, not an
//! oversight.

use oaisync_protocol::{HarvestedRecord, RecordStatus};
use oaisync_store::Existence;

use crate::counters::RecordOutcome;

/// The single action chosen for one harvested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// First sighting of an active record: store its first version.
    Create,
    /// The record changed at the source: supersede the current version.
    Update { current_version_id: String },
    /// The record was deleted at the source and the store still carries it:
    /// retire the current version.
    Archive { version_id: String },
    /// Active record with an unchanged datestamp: nothing to do.
    SkipExisting,
    /// Deleted record the store never held, a harmless side effect of the
    /// source's termination convention, silently ignored.
    SkipDeleted,
}

impl Decision {
    /// The counter bucket this decision lands in once applied.
    #[must_use]
    pub fn outcome(&self) -> RecordOutcome {
        match self {
            Decision::Create => RecordOutcome::Created,
            Decision::Update { .. } => RecordOutcome::Updated,
            Decision::Archive { .. } => RecordOutcome::Archived,
            Decision::SkipExisting => RecordOutcome::SkippedExisting,
            Decision::SkipDeleted => RecordOutcome::SkippedDeleted,
        }
    }

    /// Whether applying this decision mutates the store.
    #[must_use]
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Decision::Create | Decision::Update { .. } | Decision::Archive { .. }
        )
    }
}

/// Decide what to do with one harvested record.
///
/// A failed existence check never reaches this function; the caller skips
/// the record after logging, so all three lookup outcomes stay explicitly
/// handled.
#[must_use]
pub fn decide(record: &HarvestedRecord, existence: &Existence) -> Decision {
    match (record.status, existence) {
        (RecordStatus::Deleted, Existence::Absent) => Decision::SkipDeleted,
        (RecordStatus::Deleted, Existence::Current { version_id, .. }) => Decision::Archive {
            version_id: version_id.clone(),
        },
        (RecordStatus::Active, Existence::Absent) => Decision::Create,
        (
            RecordStatus::Active,
            Existence::Current {
                version_id,
                last_modified,
            },
        ) => {
            if *last_modified == record.datestamp {
                Decision::SkipExisting
            } else {
                Decision::Update {
                    current_version_id: version_id.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use oaisync_protocol::HarvestedRecord;

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn current(version_id: &str, last_modified: chrono::DateTime<Utc>) -> Existence {
        Existence::Current {
            version_id: version_id.to_string(),
            last_modified,
        }
    }

    #[test]
    fn test_deleted_and_absent_is_skip() {
        let record = HarvestedRecord::deleted("x1", t0());
        assert_eq!(decide(&record, &Existence::Absent), Decision::SkipDeleted);
    }

    #[test]
    fn test_deleted_and_current_is_archive() {
        let record = HarvestedRecord::deleted("x1", t0());
        assert_eq!(
            decide(&record, &current("x1_v1", t0())),
            Decision::Archive {
                version_id: "x1_v1".to_string()
            }
        );
    }

    #[test]
    fn test_active_and_absent_is_create() {
        let record = HarvestedRecord::active("x1", t0(), b"<doc/>".to_vec());
        assert_eq!(decide(&record, &Existence::Absent), Decision::Create);
    }

    #[test]
    fn test_active_with_equal_datestamp_is_skip() {
        let record = HarvestedRecord::active("x1", t0(), b"<doc/>".to_vec());
        assert_eq!(
            decide(&record, &current("x1_v1", t0())),
            Decision::SkipExisting
        );
    }

    #[test]
    fn test_active_with_differing_datestamp_is_update() {
        let record = HarvestedRecord::active("x1", t0() + Duration::hours(1), b"<doc/>".to_vec());
        assert_eq!(
            decide(&record, &current("x1_v1", t0())),
            Decision::Update {
                current_version_id: "x1_v1".to_string()
            }
        );
    }

    #[test]
    fn test_older_datestamp_still_updates() {
        // Inequality in either direction counts as a change; the source is
        // authoritative about its own modification times.
        let record = HarvestedRecord::active("x1", t0() - Duration::hours(1), b"<doc/>".to_vec());
        assert!(matches!(
            decide(&record, &current("x1_v1", t0())),
            Decision::Update { .. }
        ));
    }

    #[test]
    fn test_equal_datestamp_with_different_payload_still_skips() {
        // Datestamp equality is the sole signal; bytes are not consulted.
        let record = HarvestedRecord::active("x1", t0(), b"<doc>changed</doc>".to_vec());
        assert_eq!(
            decide(&record, &current("x1_v1", t0())),
            Decision::SkipExisting
        );
    }

    #[test]
    fn test_outcome_mapping_is_total() {
        assert_eq!(Decision::Create.outcome(), RecordOutcome::Created);
        assert_eq!(
            Decision::Update {
                current_version_id: "v".to_string()
            }
            .outcome(),
            RecordOutcome::Updated
        );
        assert_eq!(
            Decision::Archive {
                version_id: "v".to_string()
            }
            .outcome(),
            RecordOutcome::Archived
        );
        assert_eq!(Decision::SkipExisting.outcome(), RecordOutcome::SkippedExisting);
        assert_eq!(Decision::SkipDeleted.outcome(), RecordOutcome::SkippedDeleted);
    }

    #[test]
    fn test_mutates_classification() {
        assert!(Decision::Create.mutates());
        assert!(!Decision::SkipExisting.mutates());
        assert!(!Decision::SkipDeleted.mutates());
    }
}
