// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Solver configuration schema generator
//!
//! Prints the JSON schema of the webhook `config` block accepted by the lexicon solver,
//! generated from the Rust types in src/solver_config.rs.
//!
//! Usage:
//!   cargo run --bin configschema > deploy/solver-config.schema.json

use lexicon_webhook::solver_config::ProviderConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(ProviderConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
