//! Member-node client configuration.

use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

fn default_timeout_secs() -> u64 {
    120
}

/// Provenance fields applied to every stored object.
///
/// These are node-level constants, configured once per deployment and
/// copied into each version's system metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvenanceSettings {
    pub submitter: String,
    pub rights_holder: String,
    pub authoritative_node: String,
    pub origin_node: String,
    /// Format identifier of the harvested metadata documents; must agree
    /// with the metadata prefix requested from the source.
    pub format_id: String,
}

/// Configuration for the member-node HTTP client.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the node API.
    pub base_url: String,
    /// PEM client certificate path for mutual-TLS auth.
    #[serde(default)]
    pub cert_path: Option<String>,
    /// PEM private key path belonging to the certificate.
    #[serde(default)]
    pub key_path: Option<String>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Provenance constants stamped into every system metadata envelope.
    pub provenance: ProvenanceSettings,
}

impl StoreConfig {
    /// Validate the configuration.
    ///
    /// Certificate and key must be supplied together or not at all.
    pub fn validate(&self) -> StoreResult<()> {
        if self.base_url.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.cert_path.is_some() != self.key_path.is_some() {
            return Err(StoreError::InvalidConfiguration {
                message: "cert_path and key_path must be configured together".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> ProvenanceSettings {
        ProvenanceSettings {
            submitter: "urn:node:EXAMPLE".to_string(),
            rights_holder: "urn:node:EXAMPLE".to_string(),
            authoritative_node: "urn:node:mnExample".to_string(),
            origin_node: "urn:node:EXAMPLE".to_string(),
            format_id: "http://www.isotc211.org/2005/gmd".to_string(),
        }
    }

    #[test]
    fn test_cert_and_key_must_pair() {
        let mut config = StoreConfig {
            base_url: "https://mn.example.org/api".to_string(),
            cert_path: Some("/etc/certs/node.crt".to_string()),
            key_path: None,
            timeout_secs: 120,
            provenance: provenance(),
        };
        assert!(config.validate().is_err());

        config.key_path = Some("/etc/certs/node.key".to_string());
        assert!(config.validate().is_ok());

        config.cert_path = None;
        config.key_path = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = StoreConfig {
            base_url: String::new(),
            cert_path: None,
            key_path: None,
            timeout_secs: 120,
            provenance: provenance(),
        };
        assert!(config.validate().is_err());
    }
}
