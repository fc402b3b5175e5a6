// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fetch the assigned arm's document.
//!
//! Only the assigned arm is ever requested. The body is handed on as a
//! stream so the rewriter can start before the download finishes.
//! Transport errors and 5xx responses are retried with exponential backoff.

use crate::config::EdgeConfig;
use crate::error::EdgeError;
use axum::body::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Response body as a stream of chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Base delay before the first retry; doubles on each further attempt.
const BASE_BACKOFF_MS: u64 = 250;

/// Build the HTTP client shared by the variant source and the fetcher.
pub fn build_client(config: &EdgeConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("ab-edge/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// A fetched arm document, body not yet read.
pub struct FetchedDocument {
    /// URL that was requested.
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl std::fmt::Debug for FetchedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedDocument")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP fetcher for arm documents.
#[derive(Clone)]
pub struct VariantFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl VariantFetcher {
    pub fn new(client: reqwest::Client, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
        }
    }

    /// GET `url`, retrying transport errors and 5xx responses.
    ///
    /// A 5xx that survives every retry is returned as a document so its
    /// status passes through; only transport failures become errors.
    pub async fn fetch_variant(&self, url: &Url) -> Result<FetchedDocument, EdgeError> {
        let mut retries = 0u32;

        loop {
            match self.client.get(url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_server_error() && retries < self.max_retries {
                        retries += 1;
                        warn!(%url, %status, attempt = retries, "variant returned server error, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    debug!(%url, %status, "fetched variant");
                    let headers = resp.headers().clone();
                    let body = resp
                        .bytes_stream()
                        .map_err(std::io::Error::other)
                        .boxed();

                    return Ok(FetchedDocument {
                        url: url.to_string(),
                        status,
                        headers,
                        body,
                    });
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    warn!(%url, attempt = retries, "variant fetch failed, retrying: {e}");
                    tokio::time::sleep(backoff(retries)).await;
                }
                Err(source) => {
                    return Err(EdgeError::VariantFetch {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt.saturating_sub(1)))
}
