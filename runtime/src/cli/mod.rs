// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the `ab-edge` binary.

pub mod assign_cmd;
pub mod rewrite_cmd;
pub mod start;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the default `ab_edge=info` (or `debug` with `verbose`).
pub fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "ab_edge=debug" } else { "ab_edge=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
