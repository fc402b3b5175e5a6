// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then `AB_EDGE_*` environment
//! variables, then command-line flags (applied by the CLI).

use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Endpoint that serves the variant pair.
pub const DEFAULT_VARIANTS_URL: &str = "https://cfw-takehome.developers.workers.dev/api/variants";

/// Default listen address for `ab-edge serve`.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";

/// Settings shared by the server and the CLI helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    /// Variant source endpoint returning `{"variants": [a, b]}`.
    pub variants_url: String,
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,
    /// Per-request timeout for upstream calls.
    pub timeout_ms: u64,
    /// Retries on transport errors and 5xx responses when fetching an arm.
    pub max_retries: u32,
    /// How long a fetched variant pair is reused. Zero disables caching.
    pub cache_ttl_secs: u64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            variants_url: DEFAULT_VARIANTS_URL.to_string(),
            listen: SocketAddr::from(([127, 0, 0, 1], 8787)),
            timeout_ms: 10_000,
            max_retries: 2,
            cache_ttl_secs: 30,
        }
    }
}

impl EdgeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`. Unparseable values are logged and ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("AB_EDGE_VARIANTS_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.variants_url = url.to_string();
            }
        }
        overlay(&lookup, "AB_EDGE_LISTEN", &mut self.listen);
        overlay(&lookup, "AB_EDGE_TIMEOUT_MS", &mut self.timeout_ms);
        overlay(&lookup, "AB_EDGE_MAX_RETRIES", &mut self.max_retries);
        overlay(&lookup, "AB_EDGE_CACHE_TTL_SECS", &mut self.cache_ttl_secs);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn overlay<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!("ignoring {key}={raw:?}: not a valid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::default();
        assert_eq!(config.variants_url, DEFAULT_VARIANTS_URL);
        assert_eq!(config.listen.to_string(), DEFAULT_LISTEN);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overlay() {
        let config = EdgeConfig::default().with_env(env(&[
            ("AB_EDGE_VARIANTS_URL", "http://localhost:9000/api/variants"),
            ("AB_EDGE_LISTEN", "0.0.0.0:8080"),
            ("AB_EDGE_TIMEOUT_MS", "2500"),
            ("AB_EDGE_MAX_RETRIES", "0"),
            ("AB_EDGE_CACHE_TTL_SECS", "0"),
        ]));
        assert_eq!(config.variants_url, "http://localhost:9000/api/variants");
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.cache_ttl_secs, 0);
    }

    #[test]
    fn test_invalid_env_values_keep_defaults() {
        let config = EdgeConfig::default().with_env(env(&[
            ("AB_EDGE_VARIANTS_URL", "   "),
            ("AB_EDGE_LISTEN", "not-an-address"),
            ("AB_EDGE_TIMEOUT_MS", "-5"),
        ]));
        assert_eq!(config, EdgeConfig::default());
    }
}
