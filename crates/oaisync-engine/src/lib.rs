//! Reconciliation engine.
//!
//! Drives a [`RecordSource`](oaisync_protocol::RecordSource) through the
//! token-paginated result set and converges a
//! [`TargetStore`](oaisync_store::TargetStore) to the source's state: each
//! harvested record maps to exactly one of create, update, archive, or
//! skip. Record-level failures are logged and skipped; a fetch failure
//! ends the run so the next invocation retries the whole slice from the
//! unadvanced watermark (re-applied work is disarmed by the date-equality
//! check).

pub mod counters;
pub mod decision;
pub mod error;
pub mod reconciler;
pub mod summary;

pub use counters::{RecordOutcome, RunCounters};
pub use decision::{decide, Decision};
pub use error::EngineError;
pub use reconciler::{EngineConfig, Reconciler};
pub use summary::RunSummary;
