//! Member-node HTTP client.
//!
//! Implements [`TargetStore`] over the node's JSON API. Objects are
//! addressed two ways: logical records by native identifier (the series
//! key), stored versions by version identifier. Content bytes travel
//! base64-encoded inside the JSON envelope together with the system
//! metadata.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, Identity, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::{ProvenanceSettings, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::sysmeta::SystemMetadata;
use crate::traits::{Existence, TargetStore};
use crate::version::VersionMinter;

/// Create/update request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectEnvelope<'a> {
    system_metadata: &'a SystemMetadata,
    /// Base64-encoded content bytes.
    content: String,
}

/// Answer to a logical-record lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta {
    version_id: String,
    last_modified: DateTime<Utc>,
    #[serde(default)]
    archived: bool,
}

/// Answer to the watermark query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatermarkAnswer {
    last_modified: DateTime<Utc>,
}

/// reqwest-based [`TargetStore`] implementation.
pub struct MemberNodeClient {
    base_url: String,
    http: Client,
    minter: VersionMinter,
    provenance: ProvenanceSettings,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MemberNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberNodeClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MemberNodeClient {
    /// Create a client for the configured node, on the system clock.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with an injected clock (deterministic version ids).
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("oaisync/", env!("CARGO_PKG_VERSION")));

        if let (Some(cert_path), Some(key_path)) = (&config.cert_path, &config.key_path) {
            builder = builder.identity(load_identity(cert_path, key_path)?);
        }

        let http = builder
            .build()
            .map_err(|e| StoreError::InvalidConfiguration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            minter: VersionMinter::new(clock.clone()),
            provenance: config.provenance,
            clock,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: String,
        provenance: ProvenanceSettings,
        http: Client,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            minter: VersionMinter::new(clock.clone()),
            provenance,
            clock,
        }
    }

    fn envelope(
        &self,
        native_id: &str,
        version_id: &str,
        content: &[u8],
        modified: DateTime<Utc>,
    ) -> SystemMetadata {
        SystemMetadata::generate(
            content,
            native_id,
            version_id,
            modified,
            &self.provenance,
            self.clock.as_ref(),
        )
    }
}

fn load_identity(cert_path: &str, key_path: &str) -> StoreResult<Identity> {
    let mut pem = std::fs::read(cert_path).map_err(|e| StoreError::InvalidConfiguration {
        message: format!("failed to read certificate {cert_path}: {e}"),
    })?;
    let key = std::fs::read(key_path).map_err(|e| StoreError::InvalidConfiguration {
        message: format!("failed to read key {key_path}: {e}"),
    })?;
    pem.extend_from_slice(&key);

    Identity::from_pem(&pem).map_err(|e| StoreError::InvalidConfiguration {
        message: format!("failed to load client identity: {e}"),
    })
}

#[async_trait]
impl TargetStore for MemberNodeClient {
    async fn resolve_identifier(&self, native_id: &str) -> StoreResult<Existence> {
        let url = format!("{}/meta", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("id", native_id)])
            .send()
            .await
            .map_err(|e| StoreError::network_with_source("identifier lookup failed", e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Existence::Absent),
            status if status.is_success() => {
                let meta: ObjectMeta = response.json().await.map_err(|e| {
                    StoreError::Serialization {
                        message: format!("bad lookup answer for {native_id}: {e}"),
                    }
                })?;
                // A fully archived record has no current version.
                if meta.archived {
                    Ok(Existence::Absent)
                } else {
                    Ok(Existence::Current {
                        version_id: meta.version_id,
                        last_modified: meta.last_modified,
                    })
                }
            }
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                operation: format!("resolve {native_id}"),
            }),
        }
    }

    async fn create(
        &self,
        native_id: &str,
        content: &[u8],
        modified: DateTime<Utc>,
    ) -> StoreResult<String> {
        let version_id = self.minter.mint(native_id);
        let sysmeta = self.envelope(native_id, &version_id, content, modified);
        let body = ObjectEnvelope {
            system_metadata: &sysmeta,
            content: BASE64.encode(content),
        };

        let url = format!("{}/objects", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::network_with_source("create failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                operation: format!("create {native_id}"),
            });
        }

        debug!(native_id = %native_id, version_id = %version_id, "created object");
        Ok(version_id)
    }

    async fn update(
        &self,
        native_id: &str,
        content: &[u8],
        modified: DateTime<Utc>,
        current_version_id: &str,
    ) -> StoreResult<String> {
        // Re-read before superseding: the version observed at check time
        // must still be current, or this update would clobber state changed
        // out-of-band.
        match self.resolve_identifier(native_id).await? {
            Existence::Current { version_id, .. } if version_id == current_version_id => {}
            Existence::Current { version_id, .. } => {
                return Err(StoreError::consistency(
                    native_id,
                    format!(
                        "current version changed from {current_version_id} to {version_id} since the existence check"
                    ),
                ));
            }
            Existence::Absent => {
                return Err(StoreError::consistency(
                    native_id,
                    format!("version {current_version_id} is no longer current (archived or removed)"),
                ));
            }
        }

        let version_id = self.minter.mint(native_id);
        let sysmeta = self.envelope(native_id, &version_id, content, modified);
        let body = ObjectEnvelope {
            system_metadata: &sysmeta,
            content: BASE64.encode(content),
        };

        let url = format!("{}/objects", self.base_url);
        let response = self
            .http
            .put(&url)
            .query(&[("supersedes", current_version_id)])
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::network_with_source("update failed", e))?;

        match response.status() {
            status if status.is_success() => {
                debug!(
                    native_id = %native_id,
                    version_id = %version_id,
                    supersedes = %current_version_id,
                    "updated object"
                );
                Ok(version_id)
            }
            // The node refused because the superseded version is gone or no
            // longer current; we lost the race after the verification read.
            StatusCode::NOT_FOUND | StatusCode::CONFLICT => Err(StoreError::consistency(
                native_id,
                format!("node rejected superseding {current_version_id}"),
            )),
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                operation: format!("update {native_id}"),
            }),
        }
    }

    async fn archive(&self, version_id: &str) -> StoreResult<()> {
        let url = format!("{}/objects/archive", self.base_url);
        let response = self
            .http
            .put(&url)
            .query(&[("id", version_id)])
            .send()
            .await
            .map_err(|e| StoreError::network_with_source("archive failed", e))?;

        match response.status() {
            status if status.is_success() => {
                debug!(version_id = %version_id, "archived object");
                Ok(())
            }
            // Archiving an already-archived version is a quiet no-op.
            StatusCode::CONFLICT => {
                debug!(version_id = %version_id, "object was already archived");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                version_id: version_id.to_string(),
            }),
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                operation: format!("archive {version_id}"),
            }),
        }
    }

    async fn latest_watermark(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let url = format!("{}/watermark", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::network_with_source("watermark query failed", e))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => {
                let answer: WatermarkAnswer =
                    response.json().await.map_err(|e| StoreError::Serialization {
                        message: format!("bad watermark answer: {e}"),
                    })?;
                Ok(Some(answer.last_modified))
            }
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                operation: "watermark".to_string(),
            }),
        }
    }
}
