//! Forwarding handler
//!
//! Accepts any inbound request. POST requests are forwarded to the upstream
//! with the authentication headers injected; any other method is answered
//! locally with 501 Not Implemented.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, OriginalUri, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::{error::AppError, proxy::RequestContext, AppState};

/// Catch-all handler bound as the router fallback
///
/// The path and query string are forwarded verbatim, without parsing or
/// re-encoding.
pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let ctx = RequestContext::new(connect_info.map(|ConnectInfo(addr)| addr), method, path);

    let result = if ctx.method == Method::POST {
        state
            .forwarder
            .forward(&ctx, &ctx.path, &headers, body)
            .await
    } else {
        let err = AppError::UnsupportedMethod(ctx.method.clone());
        ctx.log_rejected(&err.to_string());
        Err(err)
    };

    let response = result.unwrap_or_else(IntoResponse::into_response);
    ctx.log_request_complete(response.status());
    response
}
