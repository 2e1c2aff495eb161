// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the lexicon webhook solver.

use thiserror::Error;

/// Errors that can occur while solving a DNS-01 challenge.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Malformed or incomplete solver configuration
    #[error("invalid solver configuration: {0}")]
    Configuration(String),

    /// A referenced secret, or the referenced field within it, does not exist
    #[error("secret '{namespace}/{name}' not found: {reason}")]
    NotFound {
        /// Namespace the secret was looked up in
        namespace: String,
        /// Name of the secret
        name: String,
        /// What exactly was missing
        reason: String,
    },

    /// The secret store could not be read for a reason other than absence
    #[error("failed to read secret '{namespace}/{name}': {source}")]
    SecretStore {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// The lexicon process could not be started, exited non-zero, timed out or was cancelled
    #[error("error running lexicon command: {message}")]
    Execution {
        /// What went wrong
        message: String,
        /// Captured stderr, if the process produced any
        stderr: Option<String>,
    },

    /// Lexicon ran to completion but did not report success
    #[error("lexicon result returned false")]
    Provider,

    /// `Present` or `CleanUp` was called before `Initialize`
    #[error("solver '{0}' has not been initialized")]
    NotInitialized(&'static str),

    /// The secret store client could not be built from the host context
    #[error("failed to build Kubernetes client: {0}")]
    ClientInit(#[source] kube::Error),
}

impl SolverError {
    /// Machine-readable error kind, used as metrics label and response reason
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::SecretStore { .. } => "SecretStoreError",
            Self::Execution { .. } => "ExecutionError",
            Self::Provider => "ProviderError",
            Self::NotInitialized(_) => "NotInitialized",
            Self::ClientInit(_) => "ClientInitError",
        }
    }
}

/// A failed challenge pipeline, split by stage.
///
/// `CleanUp` ignores `Soft` failures; `Present` reports both.
#[derive(Debug)]
pub enum ChallengeFailure {
    /// Failed before lexicon ran: configuration, credentials or command building
    Hard(SolverError),
    /// Lexicon failed or did not report success
    Soft(SolverError),
}

impl ChallengeFailure {
    /// Unwrap into the underlying error regardless of stage
    #[must_use]
    pub fn into_error(self) -> SolverError {
        match self {
            Self::Hard(err) | Self::Soft(err) => err,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
