// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run the rewriter over a streaming response body.
//!
//! The rewritten body is a lazy stream: each poll pulls the next upstream
//! chunk, pushes it through the rewriter and yields whatever output the
//! engine released. No task or thread is held per response, and dropping
//! the body (client disconnect) drops the upstream body with it.

use super::engine::DocumentRewriter;
use super::RuleSet;
use crate::assignment::Assignment;
use crate::compose::ResponseEnvelope;
use crate::error::TransformError;
use crate::fetcher::BodyStream;
use axum::body::Bytes;
use futures::StreamExt;
use lol_html::OutputSink;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

type Chunk = Result<Bytes, io::Error>;

/// Rewrite the envelope's body for `assignment` as it streams through.
///
/// The rule set is checked before anything is returned, so a bad selector
/// surfaces as an error instead of a truncated page. Bodies that are not
/// plain HTML are returned untouched.
pub fn transform(
    envelope: ResponseEnvelope,
    assignment: Assignment,
    rules: &RuleSet,
) -> Result<ResponseEnvelope, TransformError> {
    rules.validate()?;

    if !envelope.is_rewritable_html() {
        debug!("response is not rewritable html, passing through");
        return Ok(envelope);
    }

    let ResponseEnvelope {
        status,
        headers,
        body,
    } = envelope;

    let output = SharedOutput::default();
    let rewriter = DocumentRewriter::new(rules, assignment, output.clone())?;
    let pass = RewritePass {
        body,
        rewriter: Some(rewriter),
        output,
    };

    let body = futures::stream::unfold(pass, |mut pass| async move {
        let chunk = pass.next_chunk().await?;
        Some((chunk, pass))
    })
    .boxed();

    Ok(ResponseEnvelope {
        status,
        headers,
        body,
    })
}

/// Output sink shared between the rewriter and the stream driving it.
#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    fn take(&self) -> Bytes {
        let mut buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        Bytes::from(std::mem::take(&mut *buf))
    }
}

impl OutputSink for SharedOutput {
    fn handle_chunk(&mut self, chunk: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(chunk);
    }
}

/// State of one response body. `rewriter` is `None` once the document has
/// ended or failed.
struct RewritePass {
    body: BodyStream,
    rewriter: Option<DocumentRewriter<SharedOutput>>,
    output: SharedOutput,
}

impl RewritePass {
    async fn next_chunk(&mut self) -> Option<Chunk> {
        loop {
            if self.rewriter.is_none() {
                return None;
            }

            let step = match self.body.next().await {
                Some(Ok(bytes)) => match self.rewriter.as_mut() {
                    Some(rewriter) => rewriter.write(&bytes),
                    None => Ok(()),
                },
                Some(Err(e)) => {
                    warn!("upstream body failed mid-stream: {e}");
                    self.rewriter = None;
                    return Some(Err(e));
                }
                None => match self.rewriter.take() {
                    Some(rewriter) => rewriter.end(),
                    None => Ok(()),
                },
            };

            if let Err(e) = step {
                // End the body with an error so the client sees a broken
                // response rather than a silently truncated page.
                warn!("document rewrite failed: {e}");
                self.rewriter = None;
                return Some(Err(io::Error::other(e)));
            }

            let out = self.output.take();
            if !out.is_empty() {
                return Some(Ok(out));
            }
        }
    }
}
