//! Wire identifier to native identifier translation.

use serde::{Deserialize, Serialize};

/// The identifier namespacing convention of one OAI-PMH source.
///
/// Sources prefix every record identifier with a fixed namespace
/// (`oai:pangaea.de:` style). The target keys logical records by the bare
/// native identifier, so the prefix is stripped exactly once at the wire
/// boundary and re-applied never; all downstream code sees native ids
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierScheme {
    prefix: String,
}

impl IdentifierScheme {
    /// Create a scheme for the given namespace prefix.
    ///
    /// An empty prefix is valid and makes [`to_native`](Self::to_native)
    /// the identity function.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the namespace prefix from a wire identifier.
    ///
    /// Rule: if the wire form starts with the configured prefix, the prefix
    /// is removed once; otherwise the wire form passes through unchanged.
    /// Stripping is not repeated, so a pathological id like
    /// `oai:x:oai:x:rest` maps to `oai:x:rest`.
    #[must_use]
    pub fn to_native(&self, wire: &str) -> String {
        wire.strip_prefix(self.prefix.as_str())
            .unwrap_or(wire)
            .to_string()
    }

    /// Reconstruct the wire form of a native identifier.
    #[must_use]
    pub fn to_wire(&self, native: &str) -> String {
        format!("{}{}", self.prefix, native)
    }
}
