// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parse raw `Cookie` request headers.

use indexmap::IndexMap;

/// Cookie name that carries the visitor's arm.
pub const USER_GROUP: &str = "user-group";

/// Parse a `Cookie` header into name → value pairs, in header order.
///
/// Entries without `=` or with an empty name are skipped, surrounding
/// double quotes are stripped from values, and when a name repeats the
/// first occurrence wins. Never fails: garbage in yields an empty or
/// partial map.
pub fn parse_cookie_header(header: &str) -> IndexMap<String, String> {
    let mut cookies = IndexMap::new();

    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    cookies
}

/// Look up a single cookie by name.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    parse_cookie_header(header).shift_remove(name)
}
