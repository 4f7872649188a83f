//! Version identifier minting.
//!
//! A logical record (keyed by native identifier) accumulates one immutable
//! stored version per create or update. Version ids are derived from the
//! native identifier plus the load instant, with a disambiguation sequence
//! so that two mints for the same record never collide even when the clock
//! has not advanced between them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;

/// Mints unique version identifiers for stored versions.
pub struct VersionMinter {
    clock: Arc<dyn Clock>,
    // native id -> (last timestamp base, sequence within that base)
    issued: Mutex<HashMap<String, (String, u32)>>,
}

impl VersionMinter {
    /// Create a minter over the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a version identifier for a record.
    ///
    /// The base form is `<native_id>_<yyyymmdd_hhmmss.mmm>`; if the clock
    /// reports the same instant as the previous mint for this record, a
    /// `-N` sequence suffix is appended.
    pub fn mint(&self, native_id: &str) -> String {
        let stamp = self.clock.now().format("%Y%m%d_%H%M%S%.3f").to_string();
        let base = format!("{native_id}_{stamp}");

        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match issued.get_mut(native_id) {
            Some((last_base, seq)) if *last_base == base => {
                *seq += 1;
                format!("{base}-{seq}")
            }
            _ => {
                issued.insert(native_id.to_string(), (base.clone(), 0));
                base
            }
        }
    }
}
