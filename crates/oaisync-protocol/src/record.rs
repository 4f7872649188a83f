//! Harvested record model.

use chrono::{DateTime, NaiveDate, Utc};

/// Source-reported status of a harvested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    /// The record is live in the source repository.
    Active,
    /// The record was deleted in the source repository; it carries no payload.
    Deleted,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Active => write!(f, "active"),
            RecordStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// One item from the remote source, as seen on the wire for a single page.
///
/// Constructed by the envelope parser and discarded once the decision for
/// it has been applied. The identifier is the prefix-stripped native form
/// (see [`crate::ids::IdentifierScheme`]); the datestamp is normalized to
/// UTC regardless of how the source reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedRecord {
    /// The source's stable identifier for the logical record.
    pub native_id: String,
    /// Live or deleted, per the record header.
    pub status: RecordStatus,
    /// Source-reported last-modified instant.
    pub datestamp: DateTime<Utc>,
    /// The metadata document bytes; present iff the record is active.
    pub payload: Option<Vec<u8>>,
}

impl HarvestedRecord {
    /// Construct an active record with a payload.
    #[must_use]
    pub fn active(native_id: impl Into<String>, datestamp: DateTime<Utc>, payload: Vec<u8>) -> Self {
        Self {
            native_id: native_id.into(),
            status: RecordStatus::Active,
            datestamp,
            payload: Some(payload),
        }
    }

    /// Construct a deleted record (no payload).
    #[must_use]
    pub fn deleted(native_id: impl Into<String>, datestamp: DateTime<Utc>) -> Self {
        Self {
            native_id: native_id.into(),
            status: RecordStatus::Deleted,
            datestamp,
            payload: None,
        }
    }

    /// Whether the source reported this record as deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == RecordStatus::Deleted
    }
}

/// Parse an OAI-PMH datestamp into a UTC instant.
///
/// Accepts full second-granularity datestamps (`2024-05-01T12:30:00Z`,
/// including explicit offsets, which are normalized to UTC) and day
/// granularity (`2024-05-01`, taken as midnight UTC). Some providers only
/// advertise day granularity, so both forms must round-trip.
pub fn parse_datestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
            Ok(DateTime::from_naive_utc_and_offset(
                date.and_hms_opt(0, 0, 0).expect("midnight is valid"),
                Utc,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datestamp_second_granularity() {
        let dt = parse_datestamp("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_datestamp_offset_normalized_to_utc() {
        let dt = parse_datestamp("2024-05-01T14:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_datestamp_day_granularity() {
        let dt = parse_datestamp("2024-05-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_datestamp_rejects_garbage() {
        assert!(parse_datestamp("yesterday").is_err());
        assert!(parse_datestamp("2024-13-01").is_err());
    }

    #[test]
    fn test_deleted_record_has_no_payload() {
        let rec = HarvestedRecord::deleted("doi:10.123/x", Utc::now());
        assert!(rec.is_deleted());
        assert!(rec.payload.is_none());
    }
}
