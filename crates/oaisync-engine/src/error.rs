//! Engine error types.
//!
//! Only run-fatal conditions surface here. Everything recoverable per
//! record (malformed entries, store call failures, consistency violations)
//! is logged by the reconciler and folded into the summary's failure
//! count instead.

use thiserror::Error;

use oaisync_protocol::HarvestError;
use oaisync_store::StoreError;

/// A condition that ends the run.
///
/// When a run ends this way the watermark has not advanced, so the next
/// invocation retries the same slice from scratch.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A page fetch failed; pagination cannot safely continue without it.
    #[error("harvest fetch failed: {0}")]
    Fetch(#[from] HarvestError),

    /// The starting watermark could not be determined from the target store.
    #[error("watermark query failed: {0}")]
    Watermark(#[source] StoreError),
}
