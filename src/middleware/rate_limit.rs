//! Admission gate for the credential endpoints.
//!
//! Keys buckets by the peer address (coarse on purpose: NAT'd clients
//! share a budget). Over-budget requests are answered here with a plain
//! 429 and never reach a handler.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

pub async fn admit(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let key = client_key(&req);

    if state.limiter.try_consume(&key) {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, "rate limit exceeded");
        (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
    }
}

fn client_key(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
