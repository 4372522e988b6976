//! HTTP edge of the offline worker: classify, then serve.
//!
//! Every inbound request is bucketed the way a service worker's fetch
//! handler sees it. Documents go network-first with the cache as offline
//! fallback, and every successful document fetch refreshes the cached copy.
//! Other GETs are cache-first; a miss passes through to the origin without
//! populating the cache, so runtime traffic never widens the precached set.
//! Non-GET traffic bypasses the cache entirely and is proxied untouched.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header, request::Parts};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::store::CachedResponse;
use crate::worker::{Worker, WorkerState, snapshot};

/// Largest request body the bypass proxy will buffer.
const BYPASS_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Request headers never forwarded upstream.
const SKIPPED_REQUEST_HEADERS: &[&str] = &["host", "content-length", "connection"];

/// Response headers never mirrored back; hyper recomputes framing itself.
const SKIPPED_RESPONSE_HEADERS: &[&str] = &["transfer-encoding", "content-length", "connection"];

/// Request classes a fetch handler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Top-level HTML navigation
    Document,
    /// Any other GET (styles, scripts, fragments)
    Asset,
    /// Non-GET traffic, proxied without touching the cache
    Bypass,
}

/// Classify a request from its method and headers.
///
/// A GET is a document when the browser marks it as a navigation
/// (`Sec-Fetch-Dest: document`) or its `Accept` header asks for HTML.
#[must_use]
pub fn classify(method: &Method, headers: &HeaderMap) -> RequestClass {
    if *method != Method::GET {
        return RequestClass::Bypass;
    }

    let dest = header_str(headers, "sec-fetch-dest");
    let accept = header_str(headers, "accept");
    if dest == Some("document") || accept.is_some_and(|accept| accept.contains("text/html")) {
        return RequestClass::Document;
    }

    RequestClass::Asset
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

// =============================================================================
// Router
// =============================================================================

/// Shared gateway state.
#[derive(Clone)]
pub struct GatewayState {
    worker: Arc<Worker>,
}

impl GatewayState {
    #[must_use]
    pub const fn new(worker: Arc<Worker>) -> Self {
        Self { worker }
    }

    /// The worker behind this gateway.
    #[must_use]
    pub fn worker(&self) -> &Worker {
        &self.worker
    }
}

/// Build the gateway router: a health probe plus a catch-all fetch handler.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check reporting whether the worker is serving.
async fn health(State(state): State<GatewayState>) -> Response {
    let worker_state = state.worker().state().await;
    if worker_state == WorkerState::Activated {
        (StatusCode::OK, "ok").into_response()
    } else {
        tracing::warn!(state = %worker_state, "health check before activation");
        (StatusCode::SERVICE_UNAVAILABLE, "worker not activated").into_response()
    }
}

/// Fetch handler: classify the request and dispatch to its strategy.
///
/// The request head is split off so the read-only strategies borrow only
/// `Sync` data, keeping the handler future `Send`; `bypass` gets the request
/// reassembled untouched.
#[instrument(skip(state, request), fields(method = %request.method(), path = %request.uri()))]
async fn handle(State(state): State<GatewayState>, request: Request) -> Response {
    if !state.worker().is_serving().await {
        return (StatusCode::SERVICE_UNAVAILABLE, "worker not activated").into_response();
    }

    let (parts, body) = request.into_parts();
    match classify(&parts.method, &parts.headers) {
        RequestClass::Document => document(&state, &parts).await,
        RequestClass::Asset => asset(&state, &parts).await,
        RequestClass::Bypass => bypass(&state, Request::from_parts(parts, body)).await,
    }
}

// =============================================================================
// Fetch Strategies
// =============================================================================

/// Network-first: prefer a fresh copy, refresh the cache on success, fall
/// back to the cache when the origin is unreachable.
async fn document(state: &GatewayState, parts: &Parts) -> Response {
    let path = path_and_query(&parts.uri);
    let worker = state.worker();
    let url = worker.config().upstream_url(&path);

    let mut upstream = worker.client().get(&url);
    if let Some(accept) = parts.headers.get(header::ACCEPT) {
        upstream = upstream.header(header::ACCEPT, accept);
    }

    match upstream.send().await {
        Ok(response) => match snapshot(response).await {
            Ok(cached) => {
                if let Err(error) = worker.cache().put(&path, &cached).await {
                    tracing::warn!(%error, %path, "failed to cache document");
                }
                serve_cached(cached)
            }
            Err(error) => {
                tracing::warn!(%error, %path, "document body read failed, trying cache");
                fallback_or_bad_gateway(state, &path).await
            }
        },
        Err(error) => {
            tracing::warn!(%error, %path, "document fetch failed, trying cache");
            fallback_or_bad_gateway(state, &path).await
        }
    }
}

/// Cache-first: precached entries are served from disk; anything else passes
/// through to the origin and is never written back to the cache.
async fn asset(state: &GatewayState, parts: &Parts) -> Response {
    let path = path_and_query(&parts.uri);
    let worker = state.worker();

    if let Some(cached) = worker.cache().lookup(&path).await {
        return serve_cached(cached);
    }

    let url = worker.config().upstream_url(&path);
    match worker.client().get(&url).send().await {
        Ok(response) => match snapshot(response).await {
            Ok(fetched) => serve_cached(fetched),
            Err(error) => {
                tracing::warn!(%error, %path, "asset body read failed");
                bad_gateway()
            }
        },
        Err(error) => {
            tracing::warn!(%error, %path, "asset fetch failed");
            bad_gateway()
        }
    }
}

/// Proxy a request untouched: method, headers, and body forwarded upstream,
/// the origin's response mirrored back.
async fn bypass(state: &GatewayState, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let path = path_and_query(&parts.uri);
    let worker = state.worker();
    let url = worker.config().upstream_url(&path);

    let bytes = match axum::body::to_bytes(body, BYPASS_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, %path, "failed to buffer request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let upstream = worker
        .client()
        .request(parts.method.clone(), &url)
        .headers(forward_headers(&parts.headers))
        .body(bytes.to_vec());

    match upstream.send().await {
        Ok(response) => proxy_response(response).await,
        Err(error) => {
            tracing::warn!(%error, %path, "bypass fetch failed");
            bad_gateway()
        }
    }
}

/// Serve the cached copy if one exists, otherwise report the origin down.
async fn fallback_or_bad_gateway(state: &GatewayState, path: &str) -> Response {
    match state.worker().cache().lookup(path).await {
        Some(cached) => {
            tracing::info!(%path, "serving cached fallback");
            serve_cached(cached)
        }
        None => bad_gateway(),
    }
}

// =============================================================================
// Response Building
// =============================================================================

/// Build a response from a cache entry.
fn serve_cached(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);
    if let Some(content_type) = &cached.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
    }
    builder
        .body(Body::from(cached.body))
        .map_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response(), |response| response)
}

/// Mirror an upstream response: status, headers, body.
async fn proxy_response(response: reqwest::Response) -> Response {
    let status = response.status();
    let headers = response.headers().clone();
    let body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "failed to read upstream body");
            return bad_gateway();
        }
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in &headers {
        if SKIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(body))
        .map_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response(), |response| response)
}

/// Request headers minus the ones the proxy must own.
fn forward_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if SKIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "upstream unreachable").into_response()
}

/// The request path with its query string, the key cache entries use.
fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string())
}
