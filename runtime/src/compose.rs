// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wrap a fetched arm document into the outgoing response envelope.

use crate::assignment::Assignment;
use crate::fetcher::{BodyStream, FetchedDocument};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;

/// Headers that no longer describe the body once it has been rewritten,
/// plus hop-by-hop headers that must not be forwarded.
const DROPPED_HEADERS: [&str; 4] = [
    "content-length",
    "connection",
    "transfer-encoding",
    "keep-alive",
];

/// Mutable response: status, headers, and a streaming body.
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl ResponseEnvelope {
    /// All `Set-Cookie` values on the envelope.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Whether the body is an uncompressed HTML document.
    ///
    /// A missing `Content-Type` counts as HTML; anything encoded other than
    /// `identity` does not, since the rewriter sees raw bytes.
    pub fn is_rewritable_html(&self) -> bool {
        let html = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"));
        let identity = self
            .headers
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |enc| enc.trim().eq_ignore_ascii_case("identity"));
        html && identity
    }
}

impl std::fmt::Debug for ResponseEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEnvelope")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Copy the fetched document into a fresh envelope.
///
/// A first-time visitor gets exactly one stickiness `Set-Cookie`; a returning
/// visitor's response carries only what upstream sent.
pub fn compose(fetched: FetchedDocument, assignment: Assignment, is_new: bool) -> ResponseEnvelope {
    let FetchedDocument {
        status,
        mut headers,
        body,
        ..
    } = fetched;

    for name in DROPPED_HEADERS {
        headers.remove(name);
    }

    if is_new {
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static(assignment.set_cookie()),
        );
    }

    ResponseEnvelope {
        status,
        headers,
        body,
    }
}
