//! OAI-PMH harvesting protocol client.
//!
//! Implements the source side of the adapter: `ListRecords` request
//! construction, envelope parsing with resumption-token extraction, and a
//! reqwest-based [`HarvestClient`] behind the [`RecordSource`] trait.
//!
//! The protocol quirk this crate is built around: the source terminates a
//! complete result set with a placeholder deleted record rather than (only)
//! an empty resumption token. The client passes that sentinel through
//! unfiltered; recognizing and discarding it is the consumer's job, since
//! "more data exists" (token present) and "last entry is meaningful"
//! (sentinel absent) are independent signals.

pub mod error;
pub mod fetcher;
pub mod ids;
pub mod params;
pub mod parse;
pub mod record;

pub use error::{HarvestError, HarvestResult, RecordParseError};
pub use fetcher::{HarvestClient, HarvestConfig, RecordSource};
pub use ids::IdentifierScheme;
pub use params::ListRecordsRequest;
pub use parse::{parse_list_records, RecordPage};
pub use record::{parse_datestamp, HarvestedRecord, RecordStatus};
