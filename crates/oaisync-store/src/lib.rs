//! Target store for harvested metadata.
//!
//! The target keeps one logical record per native identifier, realized as a
//! chain of immutable stored versions: every create or update mints a fresh
//! version identifier, and updates link the new version to the one it
//! supersedes. Archiving retires a version without deleting it.
//!
//! [`TargetStore`] is the abstract collaborator the reconciliation engine
//! drives; [`MemberNodeClient`] implements it over a JSON HTTP API with
//! certificate-based client auth.

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod sysmeta;
pub mod traits;
pub mod version;

pub use client::MemberNodeClient;
pub use clock::{Clock, SystemClock};
pub use config::{ProvenanceSettings, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use sysmeta::{AccessRule, Checksum, SystemMetadata};
pub use traits::{Existence, TargetStore};
pub use version::VersionMinter;
