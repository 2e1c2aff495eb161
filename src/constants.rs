// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the lexicon webhook solver.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Solver Identity Constants
// ============================================================================

/// Name the solver is registered under.
///
/// Issuers reference this value in `spec.acme.solvers[].dns01.webhook.solverName`.
pub const SOLVER_NAME: &str = "lexicon";

/// API version of the challenge payloads exchanged with the host
pub const CHALLENGE_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind of the challenge payloads exchanged with the host
pub const CHALLENGE_KIND: &str = "ChallengePayload";

// ============================================================================
// Environment Variable Constants
// ============================================================================

/// Environment variable holding the API group the webhook is served under (required)
pub const ENV_GROUP_NAME: &str = "GROUP_NAME";

/// Environment variable overriding the path of the lexicon binary
pub const ENV_LEXICON_PATH: &str = "LEXICON_PATH";

/// Environment variable overriding the command timeout in seconds (`0` disables it)
pub const ENV_LEXICON_TIMEOUT_SECS: &str = "LEXICON_TIMEOUT_SECS";

// ============================================================================
// Lexicon Command Constants
// ============================================================================

/// Default lexicon binary, resolved through `PATH`
pub const DEFAULT_LEXICON_PATH: &str = "lexicon";

/// Default upper bound for a single lexicon invocation (5 minutes)
pub const DEFAULT_LEXICON_TIMEOUT_SECS: u64 = 300;

/// Parameter carrying the provider account user/key
pub const AUTH_USERNAME_PARAM: &str = "--auth-username";

/// Parameter carrying the secondary credential when it is an API token
pub const AUTH_TOKEN_PARAM: &str = "--auth-token";

/// Parameter carrying the secondary credential when it is a password
pub const AUTH_PASSWORD_PARAM: &str = "--auth-password";

/// Record type managed by the solver
pub const TXT_RECORD_TYPE: &str = "TXT";

/// Output format requested from lexicon
pub const OUTPUT_FORMAT: &str = "JSON";

/// Placeholder printed in logs instead of credential values
pub const REDACTED: &str = "<redacted>";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
