//! The reconciliation run loop.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use oaisync_protocol::{HarvestedRecord, ListRecordsRequest, RecordSource};
use oaisync_store::{StoreError, TargetStore};

use crate::counters::{RecordOutcome, RunCounters};
use crate::decision::{decide, Decision};
use crate::error::EngineError;
use crate::summary::RunSummary;

fn default_sentinel() -> String {
    "deleted.dummy".to_string()
}

fn default_initial_from() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .expect("fixed epoch is valid")
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Native identifier of the source's termination placeholder. A record
    /// under this identifier is never a real record and is discarded
    /// without touching the store or any counter.
    #[serde(default = "default_sentinel")]
    pub sentinel_identifier: String,
    /// Lower bound for the very first harvest against an empty store.
    #[serde(default = "default_initial_from")]
    pub initial_from: DateTime<Utc>,
    /// Decide and count, but apply nothing.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentinel_identifier: default_sentinel(),
            initial_from: default_initial_from(),
            dry_run: false,
        }
    }
}

/// Drives one reconciliation run: assemble the changed-record stream page
/// by page and converge the target store on it.
pub struct Reconciler {
    config: EngineConfig,
}

impl Reconciler {
    /// Create a reconciler.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run once.
    ///
    /// The watermark is recomputed from the target store unless an
    /// explicit `from` override is given, so a run that ends in
    /// [`EngineError`] cannot advance it: the next invocation harvests
    /// the same slice again and the date-equality skip absorbs the
    /// already-applied records.
    pub async fn run(
        &self,
        source: &dyn RecordSource,
        store: &dyn TargetStore,
        from: Option<DateTime<Utc>>,
    ) -> Result<RunSummary, EngineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let watermark = match from {
            Some(explicit) => explicit,
            None => store
                .latest_watermark()
                .await
                .map_err(EngineError::Watermark)?
                .unwrap_or(self.config.initial_from),
        };

        info!(
            run_id = %run_id,
            watermark = %watermark,
            dry_run = self.config.dry_run,
            "starting reconciliation run"
        );

        let mut counters = RunCounters::new();
        let mut failed: u32 = 0;
        let mut pages_fetched: u32 = 0;

        // First request always runs; afterwards the loop lives exactly as
        // long as the previous page carried a token. Short pages do not
        // end it and empty answers do.
        let mut request = ListRecordsRequest::initial(watermark);
        loop {
            let outcome = source.fetch(&request).await?;
            pages_fetched += 1;

            let token = match outcome {
                None => {
                    debug!(run_id = %run_id, "source reported no matching records");
                    None
                }
                Some(page) => {
                    for bad in &page.malformed {
                        warn!(
                            run_id = %run_id,
                            identifier = bad.identifier().unwrap_or("<unknown>"),
                            error = %bad,
                            "skipping malformed record entry"
                        );
                        failed += 1;
                    }

                    for record in &page.records {
                        if record.native_id == self.config.sentinel_identifier {
                            debug!(run_id = %run_id, "discarding termination sentinel");
                            continue;
                        }
                        match self.process_record(store, record).await {
                            Some(outcome) => counters.record(outcome),
                            None => failed += 1,
                        }
                    }

                    page.resumption_token
                }
            };

            match token {
                Some(next) => request = ListRecordsRequest::resume(next),
                None => break,
            }
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            watermark,
            pages_fetched,
            counters,
            failed,
        };

        info!(
            run_id = %run_id,
            pages = pages_fetched,
            created = counters.created,
            updated = counters.updated,
            archived = counters.archived,
            skipped_deleted = counters.skipped_deleted,
            skipped_existing = counters.skipped_existing,
            failed = failed,
            "reconciliation run finished"
        );

        Ok(summary)
    }

    /// Decide and apply one record. `None` means the record failed and was
    /// left for a later run; the run itself continues.
    async fn process_record(
        &self,
        store: &dyn TargetStore,
        record: &HarvestedRecord,
    ) -> Option<RecordOutcome> {
        let existence = match store.resolve_identifier(&record.native_id).await {
            Ok(existence) => existence,
            Err(e) => {
                warn!(
                    native_id = %record.native_id,
                    error = %e,
                    "existence check failed; skipping record"
                );
                return None;
            }
        };

        let decision = decide(record, &existence);

        if self.config.dry_run && decision.mutates() {
            info!(
                native_id = %record.native_id,
                decision = ?decision,
                "dry-run: would apply"
            );
            return Some(decision.outcome());
        }

        match decision {
            Decision::SkipDeleted | Decision::SkipExisting => Some(decision.outcome()),
            Decision::Create => {
                let payload = self.require_payload(record)?;
                match store.create(&record.native_id, payload, record.datestamp).await {
                    Ok(version_id) => {
                        debug!(
                            native_id = %record.native_id,
                            version_id = %version_id,
                            "created record"
                        );
                        Some(RecordOutcome::Created)
                    }
                    Err(e) => {
                        warn!(
                            native_id = %record.native_id,
                            action = "create",
                            error = %e,
                            "store call failed; record left for a later run"
                        );
                        None
                    }
                }
            }
            Decision::Update { current_version_id } => {
                let payload = self.require_payload(record)?;
                match store
                    .update(&record.native_id, payload, record.datestamp, &current_version_id)
                    .await
                {
                    Ok(version_id) => {
                        debug!(
                            native_id = %record.native_id,
                            version_id = %version_id,
                            supersedes = %current_version_id,
                            "updated record"
                        );
                        Some(RecordOutcome::Updated)
                    }
                    Err(e @ StoreError::Consistency { .. }) => {
                        // Kept apart from plain store failures: the target
                        // changed underneath us between check and act.
                        warn!(
                            native_id = %record.native_id,
                            action = "update",
                            error = %e,
                            "target state changed between existence check and update"
                        );
                        None
                    }
                    Err(e) => {
                        warn!(
                            native_id = %record.native_id,
                            action = "update",
                            error = %e,
                            "store call failed; record left for a later run"
                        );
                        None
                    }
                }
            }
            Decision::Archive { version_id } => {
                match store.archive(&version_id).await {
                    Ok(()) => {
                        debug!(
                            native_id = %record.native_id,
                            version_id = %version_id,
                            "archived record"
                        );
                        Some(RecordOutcome::Archived)
                    }
                    Err(e) => {
                        warn!(
                            native_id = %record.native_id,
                            action = "archive",
                            error = %e,
                            "store call failed; record left for a later run"
                        );
                        None
                    }
                }
            }
        }
    }

    fn require_payload<'r>(&self, record: &'r HarvestedRecord) -> Option<&'r [u8]> {
        match record.payload.as_deref() {
            Some(payload) => Some(payload),
            None => {
                // The parser only emits payload-less active records as
                // malformed, so this is unreachable in practice.
                warn!(
                    native_id = %record.native_id,
                    "active record without payload; skipping"
                );
                None
            }
        }
    }
}
