// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process-level settings for the webhook solver.
//!
//! Settings are read once at startup and handed to [`crate::solver::LexiconSolver::new`].
//! A missing `GROUP_NAME` is a startup failure, never a per-request error.

use crate::constants::{
    DEFAULT_LEXICON_PATH, DEFAULT_LEXICON_TIMEOUT_SECS, ENV_GROUP_NAME, ENV_LEXICON_PATH,
    ENV_LEXICON_TIMEOUT_SECS,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading [`Settings`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A required environment variable is unset or empty
    #[error("{0} must be specified")]
    Missing(&'static str),

    /// An environment variable holds a value that cannot be parsed
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value found in the environment
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Immutable solver settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// API group the webhook is registered under
    pub group_name: String,

    /// Path (or bare name looked up in `PATH`) of the lexicon binary
    pub lexicon_path: PathBuf,

    /// Upper bound for one lexicon invocation, `None` to wait indefinitely
    pub command_timeout: Option<Duration>,
}

impl Settings {
    /// Build settings for the given group with all other values defaulted.
    #[must_use]
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            lexicon_path: PathBuf::from(DEFAULT_LEXICON_PATH),
            command_timeout: Some(Duration::from_secs(DEFAULT_LEXICON_TIMEOUT_SECS)),
        }
    }

    /// Override the lexicon binary path.
    #[must_use]
    pub fn with_lexicon_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon_path = path.into();
        self
    }

    /// Override the command timeout.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `GROUP_NAME` is unset or empty, or if `LEXICON_TIMEOUT_SECS`
    /// is not a non-negative integer.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let group_name = lookup(ENV_GROUP_NAME)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::Missing(ENV_GROUP_NAME))?;

        let mut settings = Self::new(group_name);

        if let Some(path) = lookup(ENV_LEXICON_PATH).filter(|value| !value.trim().is_empty()) {
            settings.lexicon_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(ENV_LEXICON_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| SettingsError::Invalid {
                    name: ENV_LEXICON_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            settings.command_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(settings)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
