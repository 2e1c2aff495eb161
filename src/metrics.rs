// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the lexicon webhook solver.
//!
//! All metrics use the namespace prefix `lexicon_webhook_`.
//!
//! # Metrics Categories
//!
//! - **Challenge Metrics** - Present/CleanUp invocations and their outcomes
//! - **Command Metrics** - Lexicon invocations, outcomes and durations
//!
//! # Example
//!
//! ```rust,no_run
//! use lexicon_webhook::metrics::{gather_metrics, record_challenge};
//!
//! record_challenge("Present", "success");
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all solver metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "lexicon_webhook";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Challenge Metrics
// ============================================================================

/// Total number of challenge invocations by action and outcome
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
/// - `outcome`: `success`, or the error kind that ended the invocation
pub static CHALLENGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenges_total"),
        "Total number of challenge invocations by action and outcome",
    );
    let counter = CounterVec::new(opts, &["action", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Command Metrics
// ============================================================================

/// Total number of lexicon invocations by operation and outcome
///
/// Labels:
/// - `operation`: `create` or `delete`
/// - `outcome`: `true`, `false`, `unparsable`, `failed`
pub static COMMANDS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_commands_total"),
        "Total number of lexicon invocations by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of lexicon invocations in seconds
///
/// Labels:
/// - `operation`: `create` or `delete`
pub static COMMAND_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_command_duration_seconds"),
        "Duration of lexicon invocations in seconds by operation",
    )
    .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the outcome of a Present or CleanUp invocation
pub fn record_challenge(action: &str, outcome: &str) {
    CHALLENGES_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}

/// Record one lexicon invocation
///
/// # Arguments
/// * `operation` - `create` or `delete`
/// * `outcome` - `true`, `false`, `unparsable` or `failed`
/// * `duration` - Wall-clock time of the invocation
pub fn record_command(operation: &str, outcome: &str, duration: Duration) {
    COMMANDS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    COMMAND_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
