// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential resolution for lexicon providers.
//!
//! Each of the two credentials (API key and API secret) is resolved independently:
//!
//! 1. A non-empty inline value in the configuration is used verbatim and the secret store
//!    is never consulted.
//! 2. Otherwise the matching `*Ref` selector must name both a secret and a field; the field
//!    is fetched from the challenge namespace and decoded as UTF-8.
//!
//! Resolution never caches: every call performs up to two secret store reads.

use crate::constants::REDACTED;
use crate::errors::SolverError;
use crate::secrets::SecretStore;
use crate::solver_config::{ProviderConfig, SecretKeySelector};
use std::fmt;
use tracing::debug;

/// Final credential values handed to lexicon.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    /// Account user or API key, passed as `--auth-username`
    pub api_key: String,
    /// API token or password
    pub api_secret: String,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("api_key", &REDACTED)
            .field("api_secret", &REDACTED)
            .finish()
    }
}

/// Resolve both credentials of `config` for a challenge in `namespace`.
///
/// # Errors
///
/// - [`SolverError::Configuration`] if a credential has neither an inline value nor a
///   complete reference, or resolves to an empty or non-UTF-8 value.
/// - [`SolverError::NotFound`] if the referenced secret or field does not exist.
/// - [`SolverError::SecretStore`] if the secret store cannot be read.
pub async fn resolve(
    config: &ProviderConfig,
    namespace: &str,
    store: &dyn SecretStore,
) -> Result<ResolvedCredentials, SolverError> {
    let api_key = resolve_one(
        "apiKey",
        config.inline_api_key(),
        &config.api_key_ref,
        namespace,
        store,
    )
    .await?;

    let api_secret = resolve_one(
        "apiSecret",
        config.inline_api_secret(),
        &config.api_secret_ref,
        namespace,
        store,
    )
    .await?;

    Ok(ResolvedCredentials {
        api_key,
        api_secret,
    })
}

async fn resolve_one(
    field: &str,
    inline: Option<&str>,
    selector: &SecretKeySelector,
    namespace: &str,
    store: &dyn SecretStore,
) -> Result<String, SolverError> {
    if let Some(value) = inline {
        debug!("Using inline {field} from solver config");
        return Ok(value.to_string());
    }

    if !selector.is_complete() {
        return Err(SolverError::Configuration(format!(
            "missing key reference: {field}Ref needs both name and key (got name '{}', key '{}') in namespace '{namespace}'",
            selector.name, selector.key
        )));
    }

    debug!(
        "Resolving {field} from secret {namespace}/{} field {}",
        selector.name, selector.key
    );

    let data = store.get(namespace, &selector.name).await?;

    let bytes = data.get(&selector.key).ok_or_else(|| SolverError::NotFound {
        namespace: namespace.to_string(),
        name: selector.name.clone(),
        reason: format!("no field '{}' for {field}Ref", selector.key),
    })?;

    let value = std::str::from_utf8(bytes).map_err(|e| {
        SolverError::Configuration(format!(
            "{field}Ref field '{}' in secret '{namespace}/{}' is not valid UTF-8: {e}",
            selector.key, selector.name
        ))
    })?;

    if value.is_empty() {
        return Err(SolverError::Configuration(format!(
            "{field}Ref field '{}' in secret '{namespace}/{}' is empty",
            selector.key, selector.name
        )));
    }

    Ok(value.to_string())
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
