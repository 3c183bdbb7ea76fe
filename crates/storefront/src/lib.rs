//! Coronda Storefront library.
//!
//! The public shop API: catalog, session cart, checkout with Mercado Pago,
//! and customer accounts. Exposed as a library so the router can be
//! exercised in tests against in-memory doubles.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{Router, middleware::from_fn};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
};
use state::AppState;

/// Build the `/api` router with its middleware stack.
///
/// With `rate_limit` set, the auth routes sit behind the per-IP limiter;
/// the server must then be run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_app<S>(state: AppState, session_store: S, rate_limit: bool) -> Router
where
    S: SessionStore + Clone,
{
    let auth = if rate_limit {
        routes::auth_routes().layer(auth_rate_limiter())
    } else {
        routes::auth_routes()
    };
    let session_layer = create_session_layer(session_store, state.config());

    Router::new()
        .nest("/api", routes::routes().nest("/auth", auth))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
