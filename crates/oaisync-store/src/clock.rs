//! Injectable time source.
//!
//! Version identifiers embed the load instant, so anything that mints them
//! takes a [`Clock`] instead of reading the wall clock directly, so tests
//! drive a fake clock in controlled increments.

use chrono::{DateTime, Utc};

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
