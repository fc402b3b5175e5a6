// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Show how a `Cookie` header would be assigned.

use crate::assignment::{resolve_assignment, Resolution};
use anyhow::Result;

/// Resolve `cookie` and print the outcome.
pub fn run(cookie: Option<&str>, json: bool) -> Result<()> {
    let resolution = resolve_assignment(cookie);
    println!("{}", render(&resolution, json)?);
    Ok(())
}

fn render(resolution: &Resolution, json: bool) -> Result<String> {
    if json {
        let value = serde_json::json!({
            "assignment": resolution.assignment,
            "marker": resolution.assignment.marker(),
            "is_new": resolution.is_new,
            "set_cookie": resolution.set_cookie(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = format!(
        "arm: {} ({})",
        resolution.assignment.marker(),
        if resolution.is_new { "new visitor" } else { "returning visitor" }
    );
    if let Some(cookie) = resolution.set_cookie() {
        out.push_str(&format!("\nSet-Cookie: {cookie}"));
    }
    Ok(out)
}
