// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Lexicon Webhook - cert-manager DNS-01 solver backed by lexicon
//!
//! This crate lets cert-manager prove domain ownership through the ACME DNS-01 challenge
//! by delegating TXT record changes to [lexicon](https://github.com/dns-lexicon/dns-lexicon),
//! a command-line tool that speaks to dozens of DNS providers.
//!
//! ## Overview
//!
//! A challenge flows through four stages:
//!
//! 1. [`solver_config`] decodes the issuer's configuration payload
//! 2. [`credentials`] resolves the provider credentials, inline or from Kubernetes Secrets
//! 3. [`command`] builds the provider-agnostic lexicon argument list
//! 4. [`executor`] runs lexicon and interprets its final output line
//!
//! [`solver`] orchestrates the stages for `Present` and `CleanUp`, and [`challenge`] holds
//! the payload types exchanged with the webhook host.
//!
//! ## Modules
//!
//! - [`challenge`] - Host payloads and request dispatch
//! - [`command`] - Lexicon command construction
//! - [`constants`] - Global constants
//! - [`credentials`] - Credential resolution
//! - [`errors`] - Error taxonomy
//! - [`executor`] - Lexicon process execution
//! - [`metrics`] - Prometheus metrics
//! - [`secrets`] - Secret store access
//! - [`settings`] - Process settings from the environment
//! - [`solver`] - The solver contract and its lexicon implementation
//! - [`solver_config`] - Issuer configuration payload
//!
//! ## Example
//!
//! ```rust,no_run
//! use lexicon_webhook::challenge::{dispatch, ChallengePayload};
//! use lexicon_webhook::settings::Settings;
//! use lexicon_webhook::solver::{LexiconSolver, Solver};
//!
//! # async fn run(payload: ChallengePayload) -> anyhow::Result<()> {
//! let mut solver = LexiconSolver::new(Settings::from_env()?);
//! let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//! solver.initialize(kube::Config::infer().await?, stop_rx).await?;
//!
//! let answered = dispatch(&solver, payload).await;
//! assert!(answered.response.is_some());
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod command;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod executor;
pub mod metrics;
pub mod secrets;
pub mod settings;
pub mod solver;
pub mod solver_config;

#[cfg(test)]
mod test_support;
