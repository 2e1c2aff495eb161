// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests.

use crate::errors::SolverError;
use crate::secrets::{SecretData, SecretStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory [`SecretStore`] that counts how often it is read.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
    reads: AtomicUsize,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret with string-valued fields
    pub fn with_secret(mut self, namespace: &str, name: &str, fields: &[(&str, &str)]) -> Self {
        let data = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.as_bytes().to_vec()))
            .collect();
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }

    /// Add a secret with raw byte fields
    pub fn with_raw_secret(mut self, namespace: &str, name: &str, key: &str, value: &[u8]) -> Self {
        let mut data = SecretData::new();
        data.insert(key.to_string(), value.to_vec());
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SolverError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SolverError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
                reason: "secret does not exist".to_string(),
            })
    }
}

/// Write an executable shell script standing in for lexicon.
#[cfg(unix)]
pub fn fake_lexicon(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("lexicon");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
