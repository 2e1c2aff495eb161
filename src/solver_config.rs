// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Solver configuration supplied by the issuer.
//!
//! The configuration is set by users in `issuer.spec.acme.solvers[].dns01.webhook.config`
//! and arrives as raw JSON on every challenge request.
//!
//! # Example
//!
//! ```rust
//! use lexicon_webhook::solver_config::ProviderConfig;
//!
//! let config = ProviderConfig::from_json(Some(&serde_json::json!({
//!     "provider": "gandi",
//!     "apiKeyRef": { "name": "gandi-credentials", "key": "api-key" },
//!     "apiSecretRef": { "name": "gandi-credentials", "key": "api-secret" },
//!     "ttl": 300
//! })))
//! .unwrap();
//!
//! assert_eq!(config.provider, "gandi");
//! assert_eq!(config.ttl, Some(300));
//! ```

use crate::errors::SolverError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a single field of a Kubernetes Secret in the challenge namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecretKeySelector {
    /// Name of the Secret
    #[serde(default)]
    pub name: String,

    /// Key of the field within the Secret's data
    #[serde(default)]
    pub key: String,
}

impl SecretKeySelector {
    /// Whether both the secret name and the field key are set
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.key.is_empty()
    }
}

/// Per-issuer lexicon configuration.
///
/// Credentials should be provided through `apiKeyRef` / `apiSecretRef`. The inline
/// `apiKey` / `apiSecret` fields take precedence when set, but keep secrets in plain
/// issuer manifests and are not recommended.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Lexicon provider name, e.g. `route53`, `gandi`, `ovh`
    #[serde(default)]
    pub provider: String,

    /// Secret field holding the account user or API key
    #[serde(default)]
    pub api_key_ref: SecretKeySelector,

    /// Secret field holding the API token or password
    #[serde(default)]
    pub api_secret_ref: SecretKeySelector,

    /// TTL of the challenge record in seconds, required to present a challenge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    /// Accepted for compatibility; lexicon is never told about it
    #[serde(default)]
    pub sandbox: bool,

    /// Pass the secondary credential as `--auth-password` instead of `--auth-token`
    #[serde(default)]
    pub use_password: bool,

    /// Inline account user or API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Inline API token or password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
}

impl ProviderConfig {
    /// Decode the raw configuration attached to a challenge request.
    ///
    /// A missing or `null` payload yields the all-default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Configuration`] if the payload is not a valid configuration
    /// object.
    pub fn from_json(raw: Option<&serde_json::Value>) -> Result<Self, SolverError> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            // serde also accepts a positional array for structs
            Some(value) if !value.is_object() => Err(SolverError::Configuration(
                "error decoding solver config: expected a JSON object".to_string(),
            )),
            Some(value) => Self::deserialize(value).map_err(|e| {
                SolverError::Configuration(format!("error decoding solver config: {e}"))
            }),
        }
    }

    /// Inline API key, if set to a non-empty value
    #[must_use]
    pub fn inline_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|value| !value.is_empty())
    }

    /// Inline API secret, if set to a non-empty value
    #[must_use]
    pub fn inline_api_secret(&self) -> Option<&str> {
        self.api_secret.as_deref().filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
#[path = "solver_config_tests.rs"]
mod solver_config_tests;
