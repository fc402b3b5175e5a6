// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! AB Edge — sticky A/B variant assignment with streaming HTML rewriting.
//!
//! Each request is assigned to one of two arms (from the `user-group`
//! cookie, or a coin flip on first visit), the arm's page is fetched, the
//! stickiness cookie is attached when new, and the page is rewritten in
//! flight before it reaches the visitor.

pub mod assignment;
pub mod cli;
pub mod compose;
pub mod config;
pub mod cookie;
pub mod edge;
pub mod error;
pub mod fetcher;
pub mod rewrite;
pub mod server;
pub mod variants;

pub use assignment::{resolve_assignment, Assignment, Resolution};
pub use edge::EdgeService;
pub use error::{EdgeError, TransformError};
