// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Start the edge HTTP server.

use crate::config::EdgeConfig;
use crate::edge::EdgeService;
use crate::server;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Build the service from `config` and serve until Ctrl-C.
pub async fn run(config: EdgeConfig) -> Result<()> {
    info!("starting ab-edge v{}", env!("CARGO_PKG_VERSION"));
    info!(
        variants_url = %config.variants_url,
        cache_ttl_secs = config.cache_ttl_secs,
        max_retries = config.max_retries,
        "edge configuration"
    );

    let service = EdgeService::from_config(&config).context("failed to build HTTP client")?;
    server::serve(config.listen, Arc::new(service))
        .await
        .with_context(|| format!("server on {} failed", config.listen))
}
