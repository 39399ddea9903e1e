//! Request logging utilities for upstream forwarding
//!
//! Each inbound request gets a short correlation id so the access line,
//! upstream debug lines and failures can be matched up in the logs.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

/// Context for tracking a request through the proxy
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Caller address, when the server exposes it
    pub client_addr: Option<SocketAddr>,
    /// Inbound HTTP method
    pub method: Method,
    /// Inbound path including the query string
    pub path: String,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(client_addr: Option<SocketAddr>, method: Method, path: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            client_addr,
            method,
            path: path.into(),
        }
    }

    /// Caller address rendered for logs
    pub fn client(&self) -> String {
        self.client_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, url: &str, body_size: usize) {
        debug!(
            trace_id = %self.trace_id,
            url = %url,
            body_size = %body_size,
            "Sending request to upstream"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: StatusCode, body_size: usize) {
        debug!(
            trace_id = %self.trace_id,
            status = %status.as_u16(),
            body_size = %body_size,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log the access line for a handled request
    pub fn log_request_complete(&self, status: StatusCode) {
        info!(
            trace_id = %self.trace_id,
            client = %self.client(),
            method = %self.method,
            path = %self.path,
            status = %status.as_u16(),
            elapsed_ms = %self.elapsed_ms(),
            "{} {} {}",
            self.method,
            self.path,
            status.as_u16()
        );
    }

    /// Log a request that was refused without contacting upstream
    pub fn log_rejected(&self, reason: &str) {
        warn!(
            trace_id = %self.trace_id,
            client = %self.client(),
            method = %self.method,
            path = %self.path,
            reason = %reason,
            "Request rejected"
        );
    }

    /// Log connection error (specific for debugging connectivity issues)
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "proxy_request",
            trace_id = %self.trace_id,
            method = %self.method,
            path = %self.path,
        )
    }
}
