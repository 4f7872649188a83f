//! Remote fetcher: one `ListRecords` round-trip per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{HarvestError, HarvestResult};
use crate::ids::IdentifierScheme;
use crate::params::ListRecordsRequest;
use crate::parse::{parse_list_records, RecordPage};

fn default_timeout_secs() -> u64 {
    60
}

/// Configuration for one OAI-PMH source.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Base URL of the provider endpoint.
    pub base_url: String,
    /// Metadata format requested on the initial query (e.g. `iso19139`).
    pub metadata_prefix: String,
    /// Namespace prefix stripped from wire identifiers (e.g. `oai:pangaea.de:`).
    pub identifier_prefix: String,
    /// Contact address sent in the `From` header, when configured.
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HarvestConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> HarvestResult<()> {
        if self.base_url.is_empty() {
            return Err(HarvestError::InvalidConfiguration {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.metadata_prefix.is_empty() {
            return Err(HarvestError::InvalidConfiguration {
                message: "metadata_prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A source of harvested record pages.
///
/// One implementation speaks OAI-PMH over HTTP; tests substitute scripted
/// fakes. The contract: exactly one network round-trip per call, no
/// internal retry (fetch failure is the caller's run-fatal signal), and a
/// continuation token is only valid for the call immediately following the
/// one that returned it.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of the result set.
    ///
    /// `Ok(None)` means the source answered success with no matching
    /// records, i.e. an empty result set, not an error.
    async fn fetch(&self, request: &ListRecordsRequest) -> HarvestResult<Option<RecordPage>>;
}

/// reqwest-based [`RecordSource`] implementation.
#[derive(Debug, Clone)]
pub struct HarvestClient {
    config: HarvestConfig,
    scheme: IdentifierScheme,
    http: Client,
}

impl HarvestClient {
    /// Create a client for the configured source.
    pub fn new(config: HarvestConfig) -> HarvestResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("oaisync/", env!("CARGO_PKG_VERSION")));
        if let Some(ref email) = config.contact_email {
            let mut headers = reqwest::header::HeaderMap::new();
            if let Ok(value) = reqwest::header::HeaderValue::from_str(email) {
                headers.insert(reqwest::header::FROM, value);
            }
            builder = builder.default_headers(headers);
        }

        let http = builder
            .build()
            .map_err(|e| HarvestError::InvalidConfiguration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let scheme = IdentifierScheme::new(config.identifier_prefix.clone());
        Ok(Self {
            config,
            scheme,
            http,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(config: HarvestConfig, http: Client) -> Self {
        let scheme = IdentifierScheme::new(config.identifier_prefix.clone());
        Self {
            config,
            scheme,
            http,
        }
    }

    /// The identifier scheme in effect for this source.
    #[must_use]
    pub fn scheme(&self) -> &IdentifierScheme {
        &self.scheme
    }
}

#[async_trait]
impl RecordSource for HarvestClient {
    async fn fetch(&self, request: &ListRecordsRequest) -> HarvestResult<Option<RecordPage>> {
        let pairs = request.to_query_pairs(&self.config.metadata_prefix);

        debug!(
            base_url = %self.config.base_url,
            initial = request.is_initial(),
            "requesting ListRecords page"
        );

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| HarvestError::network_with_source("ListRecords request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.config.base_url.clone(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::network_with_source("failed to read response body", e))?;

        parse_list_records(&body, &self.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HarvestConfig {
        HarvestConfig {
            base_url: "https://oai.example.org/provider".to_string(),
            metadata_prefix: "iso19139".to_string(),
            identifier_prefix: "oai:example.org:".to_string(),
            contact_email: None,
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.base_url.clear();
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.metadata_prefix.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_client_carries_identifier_scheme() {
        let client = HarvestClient::new(config()).unwrap();
        assert_eq!(client.scheme().to_native("oai:example.org:r1"), "r1");
    }
}
