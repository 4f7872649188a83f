//! `ListRecords` response envelope parsing.
//!
//! Event-driven quick-xml parsing of the OAI-PMH envelope. The resumption
//! token is pulled out of the record sequence here: it is pagination
//! metadata, not a record. A `noRecordsMatch` protocol answer maps to an
//! empty result (`Ok(None)`), every other `<error>` code is a fetch
//! failure. Individual records that cannot be decoded are collected as
//! [`RecordParseError`]s without poisoning the rest of the page.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::trace;

use crate::error::{HarvestError, HarvestResult, RecordParseError};
use crate::ids::IdentifierScheme;
use crate::record::{parse_datestamp, HarvestedRecord, RecordStatus};

/// Protocol error code meaning "the query matched nothing", an empty
/// result, not a failure.
const NO_RECORDS_MATCH: &str = "noRecordsMatch";

/// One parsed page of a `ListRecords` result set.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    /// Successfully decoded records, in wire order.
    pub records: Vec<HarvestedRecord>,
    /// Entries that failed to decode; reported per record, never page-fatal.
    pub malformed: Vec<RecordParseError>,
    /// Cursor for the next page, when the source reported one.
    ///
    /// Presence of a token and presence of the trailing sentinel record are
    /// independent signals; neither implies the other.
    pub resumption_token: Option<String>,
}

impl RecordPage {
    /// Whether the page contributed neither records nor a continuation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.malformed.is_empty() && self.resumption_token.is_none()
    }
}

/// Parse a `ListRecords` response body.
///
/// Returns `Ok(None)` when the source answered `noRecordsMatch`.
pub fn parse_list_records(
    body: &str,
    scheme: &IdentifierScheme,
) -> HarvestResult<Option<RecordPage>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut page = RecordPage::default();
    let mut saw_list_records = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"OAI-PMH" => {}
                b"ListRecords" => saw_list_records = true,
                b"record" => match parse_record(&mut reader, scheme)? {
                    Ok(record) => page.records.push(record),
                    Err(bad) => page.malformed.push(bad),
                },
                b"resumptionToken" => {
                    let text = reader.read_text(e.name())?;
                    let token = text.trim();
                    if !token.is_empty() {
                        page.resumption_token = Some(token.to_string());
                    }
                }
                b"error" => {
                    let code = error_code(&e);
                    let message = reader.read_text(e.name())?.trim().to_string();
                    return protocol_error(&code, &message);
                }
                _ => {
                    // responseDate, request, and anything unrecognized.
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"error" => {
                    let code = error_code(&e);
                    return protocol_error(&code, "");
                }
                // An empty <resumptionToken/> means "no continuation".
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_list_records {
        return Err(HarvestError::envelope(
            "response contained neither a ListRecords element nor an error",
        ));
    }

    trace!(
        records = page.records.len(),
        malformed = page.malformed.len(),
        has_token = page.resumption_token.is_some(),
        "parsed ListRecords page"
    );
    Ok(Some(page))
}

fn protocol_error(code: &str, message: &str) -> HarvestResult<Option<RecordPage>> {
    if code == NO_RECORDS_MATCH {
        return Ok(None);
    }
    Err(HarvestError::Protocol {
        code: code.to_string(),
        message: message.to_string(),
    })
}

fn error_code(e: &quick_xml::events::BytesStart<'_>) -> String {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"code")
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
        .unwrap_or_default()
}

/// Parse one `<record>` element.
///
/// The outer `Err` is an envelope-level failure (truncated or unreadable
/// XML, fatal for the whole fetch); the inner `Err` is a recoverable
/// single-record decode failure.
fn parse_record(
    reader: &mut Reader<&[u8]>,
    scheme: &IdentifierScheme,
) -> HarvestResult<Result<HarvestedRecord, RecordParseError>> {
    let mut wire_identifier: Option<String> = None;
    let mut raw_datestamp: Option<String> = None;
    let mut deleted = false;
    let mut payload: Option<Vec<u8>> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"header" => {
                    deleted = e
                        .attributes()
                        .flatten()
                        .any(|attr| attr.key.as_ref() == b"status" && attr.value.as_ref() == b"deleted");
                }
                b"identifier" => {
                    wire_identifier = Some(reader.read_text(e.name())?.trim().to_string());
                }
                b"datestamp" => {
                    raw_datestamp = Some(reader.read_text(e.name())?.trim().to_string());
                }
                b"metadata" => {
                    // The whole metadata subtree, markup included, is the
                    // payload; it is never interpreted here.
                    let inner = reader.read_text(e.name())?;
                    payload = Some(inner.trim().as_bytes().to_vec());
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"record" => break,
            Event::Eof => {
                return Err(HarvestError::envelope("truncated record element"));
            }
            _ => {}
        }
    }

    let Some(wire) = wire_identifier.filter(|id| !id.is_empty()) else {
        return Ok(Err(RecordParseError::MissingIdentifier));
    };

    let Some(raw) = raw_datestamp.filter(|d| !d.is_empty()) else {
        return Ok(Err(RecordParseError::MissingDatestamp { identifier: wire }));
    };

    let Ok(datestamp) = parse_datestamp(&raw) else {
        return Ok(Err(RecordParseError::BadDatestamp {
            identifier: wire,
            value: raw,
        }));
    };

    let native_id = scheme.to_native(&wire);

    if deleted {
        return Ok(Ok(HarvestedRecord {
            native_id,
            status: RecordStatus::Deleted,
            datestamp,
            payload: None,
        }));
    }

    match payload.filter(|p| !p.is_empty()) {
        Some(bytes) => Ok(Ok(HarvestedRecord {
            native_id,
            status: RecordStatus::Active,
            datestamp,
            payload: Some(bytes),
        })),
        None => Ok(Err(RecordParseError::MissingPayload { identifier: wire })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn scheme() -> IdentifierScheme {
        IdentifierScheme::new("oai:example.org:")
    }

    fn envelope(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-06-01T00:00:00Z</responseDate>
  <request verb="ListRecords">https://oai.example.org/provider</request>
  {inner}
</OAI-PMH>"#
        )
    }

    fn active_record(id: &str, datestamp: &str, body: &str) -> String {
        format!(
            "<record><header><identifier>{id}</identifier><datestamp>{datestamp}</datestamp></header>\
             <metadata>{body}</metadata></record>"
        )
    }

    #[test]
    fn test_page_with_records_and_token() {
        let xml = envelope(&format!(
            "<ListRecords>{}{}<resumptionToken cursor=\"0\">cursor-50</resumptionToken></ListRecords>",
            active_record("oai:example.org:r1", "2024-05-01T10:00:00Z", "<doc><title>one</title></doc>"),
            active_record("oai:example.org:r2", "2024-05-02", "<doc/>"),
        ));

        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.malformed.is_empty());
        assert_eq!(page.resumption_token.as_deref(), Some("cursor-50"));

        let first = &page.records[0];
        assert_eq!(first.native_id, "r1");
        assert_eq!(first.status, RecordStatus::Active);
        assert_eq!(
            first.datestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(
            first.payload.as_deref(),
            Some("<doc><title>one</title></doc>".as_bytes())
        );

        // Day-granularity datestamp normalizes to midnight UTC.
        assert_eq!(
            page.records[1].datestamp,
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_deleted_record_has_no_payload() {
        let xml = envelope(
            "<ListRecords><record><header status=\"deleted\">\
             <identifier>oai:example.org:gone</identifier>\
             <datestamp>2024-05-03T00:00:00Z</datestamp>\
             </header></record></ListRecords>",
        );

        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].status, RecordStatus::Deleted);
        assert_eq!(page.records[0].native_id, "gone");
        assert!(page.records[0].payload.is_none());
    }

    #[test]
    fn test_token_and_trailing_sentinel_are_independent() {
        // The sentinel deleted record arrives after the token element; the
        // parser keeps both; discarding the sentinel is the engine's call.
        let xml = envelope(&format!(
            "<ListRecords>{}<resumptionToken>next</resumptionToken>\
             <record><header status=\"deleted\">\
             <identifier>oai:example.org:deleted.dummy</identifier>\
             <datestamp>2024-05-03T00:00:00Z</datestamp>\
             </header></record></ListRecords>",
            active_record("oai:example.org:r1", "2024-05-01T10:00:00Z", "<doc/>"),
        ));

        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(page.resumption_token.as_deref(), Some("next"));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].native_id, "deleted.dummy");
    }

    #[test]
    fn test_empty_resumption_token_means_done() {
        let xml = envelope(&format!(
            "<ListRecords>{}<resumptionToken/></ListRecords>",
            active_record("oai:example.org:r1", "2024-05-01T10:00:00Z", "<doc/>"),
        ));
        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert!(page.resumption_token.is_none());

        let xml = envelope(&format!(
            "<ListRecords>{}<resumptionToken></resumptionToken></ListRecords>",
            active_record("oai:example.org:r1", "2024-05-01T10:00:00Z", "<doc/>"),
        ));
        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn test_no_records_match_is_empty_not_error() {
        let xml = envelope("<error code=\"noRecordsMatch\">nothing changed</error>");
        assert!(parse_list_records(&xml, &scheme()).unwrap().is_none());

        let xml = envelope("<error code=\"noRecordsMatch\"/>");
        assert!(parse_list_records(&xml, &scheme()).unwrap().is_none());
    }

    #[test]
    fn test_other_protocol_errors_are_fatal() {
        let xml = envelope("<error code=\"badResumptionToken\">expired</error>");
        let err = parse_list_records(&xml, &scheme()).unwrap_err();
        match err {
            HarvestError::Protocol { code, message } => {
                assert_eq!(code, "badResumptionToken");
                assert_eq!(message, "expired");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_record_does_not_poison_page() {
        let xml = envelope(&format!(
            "<ListRecords>\
             <record><header><identifier>oai:example.org:bad</identifier></header>\
             <metadata><doc/></metadata></record>\
             {}</ListRecords>",
            active_record("oai:example.org:good", "2024-05-01T10:00:00Z", "<doc/>"),
        ));

        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].native_id, "good");
        assert_eq!(
            page.malformed,
            vec![RecordParseError::MissingDatestamp {
                identifier: "oai:example.org:bad".to_string()
            }]
        );
    }

    #[test]
    fn test_bad_datestamp_is_recoverable() {
        let xml = envelope(&format!(
            "<ListRecords>{}</ListRecords>",
            active_record("oai:example.org:x", "when?", "<doc/>"),
        ));
        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert!(page.records.is_empty());
        assert_eq!(
            page.malformed,
            vec![RecordParseError::BadDatestamp {
                identifier: "oai:example.org:x".to_string(),
                value: "when?".to_string()
            }]
        );
    }

    #[test]
    fn test_active_record_without_payload_is_malformed() {
        let xml = envelope(
            "<ListRecords><record><header>\
             <identifier>oai:example.org:hollow</identifier>\
             <datestamp>2024-05-01T10:00:00Z</datestamp>\
             </header></record></ListRecords>",
        );
        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(
            page.malformed,
            vec![RecordParseError::MissingPayload {
                identifier: "oai:example.org:hollow".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_list_records_is_envelope_error() {
        let xml = envelope("");
        assert!(matches!(
            parse_list_records(&xml, &scheme()),
            Err(HarvestError::Envelope { .. })
        ));
    }

    #[test]
    fn test_short_page_with_token_is_kept() {
        // Fewer records than the page limit plus a live token: the token
        // still wins; short pages do not mean "done".
        let xml = envelope(&format!(
            "<ListRecords>{}<resumptionToken>more</resumptionToken></ListRecords>",
            active_record("oai:example.org:only", "2024-05-01T10:00:00Z", "<doc/>"),
        ));
        let page = parse_list_records(&xml, &scheme()).unwrap().unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.resumption_token.as_deref(), Some("more"));
    }
}
