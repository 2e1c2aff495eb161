// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Secret store access for credential resolution.
//!
//! [`SecretStore`] is the only seam through which the solver reads credentials. The
//! production implementation, [`KubeSecretStore`], reads namespaced Kubernetes Secrets.
//! Implementations must be safe to share between concurrent challenge invocations.

use crate::errors::SolverError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Decoded data of a single secret, keyed by field name.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Read-only access to namespaced secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch all data fields of the secret `name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NotFound`] if the secret does not exist, and
    /// [`SolverError::SecretStore`] for any other read failure.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SolverError>;
}

/// [`SecretStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Wrap an existing Kubernetes client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SolverError> {
        debug!("Fetching secret {namespace}/{name}");

        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = secret_api
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, namespace, name))?;

        Ok(secret_data(secret))
    }
}

/// Translate a Kubernetes API error for `namespace/name` into a [`SolverError`].
///
/// HTTP 404 becomes [`SolverError::NotFound`]; everything else is a store failure.
#[must_use]
pub fn map_kube_error(err: kube::Error, namespace: &str, name: &str) -> SolverError {
    match err {
        kube::Error::Api(ref ae) if ae.code == 404 => SolverError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
            reason: "secret does not exist".to_string(),
        },
        other => SolverError::SecretStore {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source: other,
        },
    }
}

/// Flatten a Secret's `data` into plain bytes.
///
/// `stringData` is write-only on the API server, so only `data` is considered.
#[must_use]
pub fn secret_data(secret: Secret) -> SecretData {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect()
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod secrets_tests;
