//! HTTP routes for the proxy
//!
//! Every path and method lands on the forwarding handler; there is no
//! local route table.

pub mod forward;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Largest inbound body accepted for forwarding
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(forward::forward_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
