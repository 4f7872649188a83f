//! System metadata envelope construction.
//!
//! Every stored version carries a system metadata document describing the
//! object: content-derived fields (checksum, size), identity fields
//! (version id, the native identifier as the cross-version series key),
//! provenance fields from static node configuration, and a generic
//! public-read access policy. Record-level write control lives in the
//! source repository and cascades down through harvesting, so no
//! per-record policies are ever assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::config::ProvenanceSettings;

/// Subject granted read access on every stored object.
const PUBLIC_SUBJECT: &str = "public";

/// Checksum of a stored object's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Digest algorithm name as the node expects it.
    pub algorithm: String,
    /// Hex-encoded digest value.
    pub value: String,
}

impl Checksum {
    /// Compute the SHA-256 checksum of the given content.
    #[must_use]
    pub fn sha256(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self {
            algorithm: "SHA-256".to_string(),
            value: hex::encode(digest),
        }
    }
}

/// One subject/permissions grant in an access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub subject: String,
    pub permissions: Vec<String>,
}

/// System metadata for one stored version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetadata {
    /// Identifier of this immutable version.
    pub version_id: String,
    /// The native identifier, stored as the cross-version series key.
    pub series_id: String,
    /// Format identifier of the metadata document.
    pub format_id: String,
    /// Content size in bytes.
    pub size: u64,
    /// Content checksum.
    pub checksum: Checksum,
    /// When this version was loaded into the node.
    pub date_uploaded: DateTime<Utc>,
    /// Source-reported last-modified instant of the record.
    pub last_modified: DateTime<Utc>,
    pub submitter: String,
    pub rights_holder: String,
    pub authoritative_node: String,
    pub origin_node: String,
    /// Access policy; always the public-read grant.
    pub access: Vec<AccessRule>,
}

impl SystemMetadata {
    /// Build the envelope for one version of a record.
    pub fn generate(
        content: &[u8],
        native_id: &str,
        version_id: &str,
        modified: DateTime<Utc>,
        settings: &ProvenanceSettings,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            version_id: version_id.to_string(),
            series_id: native_id.to_string(),
            format_id: settings.format_id.clone(),
            size: content.len() as u64,
            checksum: Checksum::sha256(content),
            date_uploaded: clock.now(),
            last_modified: modified,
            submitter: settings.submitter.clone(),
            rights_holder: settings.rights_holder.clone(),
            authoritative_node: settings.authoritative_node.clone(),
            origin_node: settings.origin_node.clone(),
            access: vec![public_read_rule()],
        }
    }
}

/// The generic public read-only grant assigned to every stored object.
#[must_use]
pub fn public_read_rule() -> AccessRule {
    AccessRule {
        subject: PUBLIC_SUBJECT.to_string(),
        permissions: vec!["read".to_string()],
    }
}
