// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Apply the rewrite rules to a local HTML file.

use crate::assignment::Assignment;
use crate::rewrite::{default_rules, rewrite_document};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Rewrite `input` for `arm`, writing to `output` or stdout.
pub fn run(input: &Path, arm: Assignment, output: Option<&Path>) -> Result<()> {
    let html = std::fs::read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let rewritten = rewrite_document(&default_rules(), &html, arm)
        .with_context(|| format!("failed to rewrite {}", input.display()))?;

    match output {
        Some(path) => std::fs::write(path, &rewritten)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&rewritten)
            .context("failed to write to stdout")?,
    }
    Ok(())
}
