// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP front for the edge service.
//!
//! Every path and method except `/health` goes to [`EdgeService::handle`].

use crate::edge::EdgeService;
use crate::error::EdgeError;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Instrument};

/// Build the router. `/health` is answered locally; everything else is
/// an edge request.
pub fn router(service: Arc<EdgeService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(edge)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, service: Arc<EdgeService>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("edge listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await?;

    info!("server stopped");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn edge(State(service): State<Arc<EdgeService>>, headers: HeaderMap) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let cookie = cookie_header(&headers);

    let result = service
        .handle(cookie.as_deref())
        .instrument(tracing::info_span!("edge", %request_id))
        .await;

    match result {
        Ok(envelope) => {
            let mut response = Response::new(Body::from_stream(envelope.body));
            *response.status_mut() = envelope.status;
            *response.headers_mut() = envelope.headers;
            response
        }
        Err(e) => {
            error!(%request_id, "edge request failed: {e}");
            e.into_response()
        }
    }
}

/// Join every `Cookie` header into one string. HTTP/2 clients may send
/// cookies split across several headers.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            EdgeError::ConfigFetch { .. } => (
                StatusCode::BAD_GATEWAY,
                "variant configuration is unavailable",
            ),
            EdgeError::VariantFetch { .. } => {
                (StatusCode::BAD_GATEWAY, "assigned variant is unavailable")
            }
            EdgeError::Transform(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to prepare the variant",
            ),
        };
        (status, format!("{message}\n")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_header_joins_split_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("user-group=group_two"));
        assert_eq!(
            cookie_header(&headers).as_deref(),
            Some("a=1; user-group=group_two")
        );
        assert_eq!(cookie_header(&HeaderMap::new()), None);
    }

    #[test]
    fn test_upstream_errors_map_to_bad_gateway() {
        let resp = EdgeError::config("http://cfg", "down").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = EdgeError::Transform(crate::error::TransformError::Rewriter("x".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
