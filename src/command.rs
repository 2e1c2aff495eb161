// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lexicon command construction.
//!
//! Building a command is a pure function of its inputs. The resulting argument list has
//! the shape:
//!
//! ```text
//! <provider> --auth-username <key> (--auth-token|--auth-password) <secret> \
//!     create <zone> TXT --name <fqdn> --ttl <ttl> --content=<challenge> --output JSON
//! <provider> --auth-username <key> (--auth-token|--auth-password) <secret> \
//!     delete <zone> TXT --name <fqdn> --content <challenge> --output JSON
//! ```
//!
//! Zone and FQDN are passed through untouched; the host has already resolved them.

use crate::constants::{
    AUTH_PASSWORD_PARAM, AUTH_TOKEN_PARAM, AUTH_USERNAME_PARAM, OUTPUT_FORMAT, REDACTED,
    TXT_RECORD_TYPE,
};
use crate::credentials::ResolvedCredentials;
use crate::errors::SolverError;
use std::fmt;

/// Record operation requested from lexicon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnsOperation {
    /// Create the challenge TXT record
    Create,
    /// Delete the challenge TXT record
    Delete,
}

impl DnsOperation {
    /// Lexicon action name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for DnsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built lexicon invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Operation the command performs
    pub operation: DnsOperation,
    /// Lexicon provider name
    pub provider: String,
    /// Value of `--auth-username`
    pub username: String,
    /// Value of the token/password parameter
    pub auth_value: String,
    /// Pass `auth_value` as `--auth-password` rather than `--auth-token`
    pub use_password: bool,
    /// Provider-command arguments following the auth parameters
    pub command: Vec<String>,
}

impl CommandSpec {
    /// Name of the parameter carrying the secondary credential
    #[must_use]
    pub fn auth_param(&self) -> &'static str {
        if self.use_password {
            AUTH_PASSWORD_PARAM
        } else {
            AUTH_TOKEN_PARAM
        }
    }

    /// Full argument list passed to the lexicon binary
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        self.render(&self.username, &self.auth_value)
    }

    /// Argument list with both credential values replaced, suitable for logs
    #[must_use]
    pub fn redacted_args(&self) -> Vec<String> {
        self.render(REDACTED, REDACTED)
    }

    fn render(&self, username: &str, auth_value: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(self.command.len() + 7);
        args.push(self.provider.clone());
        args.push(AUTH_USERNAME_PARAM.to_string());
        args.push(username.to_string());
        args.push(self.auth_param().to_string());
        args.push(auth_value.to_string());
        args.extend(self.command.iter().cloned());
        args.push("--output".to_string());
        args.push(OUTPUT_FORMAT.to_string());
        args
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("operation", &self.operation)
            .field("args", &self.redacted_args())
            .finish()
    }
}

/// Parameters of a single record change.
#[derive(Clone, Copy, Debug)]
pub struct RecordChange<'a> {
    /// Create or delete
    pub operation: DnsOperation,
    /// Zone owning the record, e.g. `example.com.`
    pub zone: &'a str,
    /// Record name, e.g. `_acme-challenge.example.com.`
    pub fqdn: &'a str,
    /// TXT content
    pub content: &'a str,
    /// Record TTL, required for [`DnsOperation::Create`]
    pub ttl: Option<i64>,
}

/// Build the lexicon command for a record change.
///
/// # Errors
///
/// Returns [`SolverError::Configuration`] when a create is requested without a TTL.
pub fn build_command(
    provider: &str,
    change: &RecordChange<'_>,
    credentials: &ResolvedCredentials,
    use_password: bool,
) -> Result<CommandSpec, SolverError> {
    let mut command = vec![
        change.operation.as_str().to_string(),
        change.zone.to_string(),
        TXT_RECORD_TYPE.to_string(),
        "--name".to_string(),
        change.fqdn.to_string(),
    ];

    match change.operation {
        DnsOperation::Create => {
            let ttl = change.ttl.ok_or_else(|| {
                SolverError::Configuration(format!(
                    "ttl is required to create the challenge record for '{}'",
                    change.fqdn
                ))
            })?;
            command.push("--ttl".to_string());
            command.push(ttl.to_string());
            command.push(format!("--content={}", change.content));
        }
        DnsOperation::Delete => {
            command.push("--content".to_string());
            command.push(change.content.to_string());
        }
    }

    Ok(CommandSpec {
        operation: change.operation,
        provider: provider.to_string(),
        username: credentials.api_key.clone(),
        auth_value: credentials.api_secret.clone(),
        use_password,
        command,
    })
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
