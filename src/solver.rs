// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Challenge solver orchestration.
//!
//! [`Solver`] is the plugin contract the webhook host drives. [`LexiconSolver`] implements
//! it by running every invocation through the same pipeline:
//!
//! ```text
//! decode config -> resolve credentials -> build command -> execute -> interpret result
//! ```
//!
//! Each invocation owns its configuration, credentials and command; the only state shared
//! between concurrent invocations is the read-only secret store and the executor settings.
//!
//! `Present` reports every failure. `CleanUp` is best effort: once the lexicon command has
//! been built, execution and provider failures are logged and swallowed so that a flaky DNS
//! provider never blocks certificate issuance on cleanup.

use crate::challenge::ChallengeRequest;
use crate::command::{build_command, DnsOperation, RecordChange};
use crate::constants::SOLVER_NAME;
use crate::credentials;
use crate::errors::{ChallengeFailure, SolverError};
use crate::executor::{CommandExecutor, ExecutionResult};
use crate::metrics;
use crate::secrets::{KubeSecretStore, SecretStore};
use crate::settings::Settings;
use crate::solver_config::ProviderConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Contract between the webhook host and a DNS-01 solver.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name the host routes issuer configuration by.
    ///
    /// Must be unique within the group the webhook is served under.
    fn name(&self) -> &'static str;

    /// Prepare the solver before any challenge is handled.
    ///
    /// `stop` turns `true` when the host is shutting down.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver cannot reach its collaborators. The host treats this
    /// as fatal.
    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        stop: watch::Receiver<bool>,
    ) -> Result<(), SolverError>;

    /// Publish the challenge record.
    ///
    /// Must tolerate being called several times for the same challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be published.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Remove the challenge record, and only the one carrying `request.key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be processed at all.
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), SolverError>;
}

/// DNS-01 solver that delegates record changes to the lexicon command-line tool.
pub struct LexiconSolver {
    settings: Settings,
    executor: CommandExecutor,
    secrets: Option<Arc<dyn SecretStore>>,
}

impl LexiconSolver {
    /// Create an uninitialized solver.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let executor = CommandExecutor::from_settings(&settings);
        Self {
            settings,
            executor,
            secrets: None,
        }
    }

    /// Use `store` for credential lookups instead of the Kubernetes API.
    #[must_use]
    pub fn with_secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(store);
        self
    }

    /// Settings the solver was created with
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn run(
        &self,
        request: &ChallengeRequest,
        operation: DnsOperation,
    ) -> Result<ExecutionResult, ChallengeFailure> {
        let store = self
            .secrets
            .as_deref()
            .ok_or(ChallengeFailure::Hard(SolverError::NotInitialized(
                SOLVER_NAME,
            )))?;

        let config =
            ProviderConfig::from_json(request.config.as_ref()).map_err(ChallengeFailure::Hard)?;
        debug!(
            "Decoded configuration: provider '{}', ttl {:?}, usePassword {}, sandbox {}",
            config.provider, config.ttl, config.use_password, config.sandbox
        );

        let credentials = credentials::resolve(&config, &request.resource_namespace, store)
            .await
            .map_err(ChallengeFailure::Hard)?;

        let change = RecordChange {
            operation,
            zone: &request.resolved_zone,
            fqdn: &request.resolved_fqdn,
            content: &request.key,
            ttl: config.ttl,
        };
        let spec = build_command(&config.provider, &change, &credentials, config.use_password)
            .map_err(ChallengeFailure::Hard)?;

        let result = self
            .executor
            .execute(&spec)
            .await
            .map_err(ChallengeFailure::Soft)?;

        if !result.success {
            return Err(ChallengeFailure::Soft(SolverError::Provider));
        }
        Ok(result)
    }
}

#[async_trait]
impl Solver for LexiconSolver {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        stop: watch::Receiver<bool>,
    ) -> Result<(), SolverError> {
        debug!("Initializing Kubernetes client");
        let client = kube::Client::try_from(kube_config).map_err(SolverError::ClientInit)?;
        self.secrets = Some(Arc::new(KubeSecretStore::new(client)));
        self.executor = self.executor.clone().with_stop_signal(stop);

        info!(
            "Solver '{}' initialized for group {} using {}",
            SOLVER_NAME,
            self.settings.group_name,
            self.executor.program().display()
        );
        Ok(())
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            "Present: fqdn [{}] zone [{}]",
            request.resolved_fqdn, request.resolved_zone
        );

        match self.run(request, DnsOperation::Create).await {
            Ok(_) => {
                info!("Presented challenge record {}", request.resolved_fqdn);
                metrics::record_challenge("Present", "success");
                Ok(())
            }
            Err(failure) => {
                let err = failure.into_error();
                error!("Present failed for {}: {err}", request.resolved_fqdn);
                metrics::record_challenge("Present", err.kind());
                Err(err)
            }
        }
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            "CleanUp: fqdn [{}] zone [{}]",
            request.resolved_fqdn, request.resolved_zone
        );

        match self.run(request, DnsOperation::Delete).await {
            Ok(_) => {
                info!("Removed challenge record {}", request.resolved_fqdn);
                metrics::record_challenge("CleanUp", "success");
                Ok(())
            }
            Err(ChallengeFailure::Soft(err)) => {
                warn!(
                    "CleanUp of {} did not complete, ignoring: {err}",
                    request.resolved_fqdn
                );
                metrics::record_challenge("CleanUp", "ignored");
                Ok(())
            }
            Err(ChallengeFailure::Hard(err)) => {
                error!("CleanUp failed for {}: {err}", request.resolved_fqdn);
                metrics::record_challenge("CleanUp", err.kind());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod solver_tests;
