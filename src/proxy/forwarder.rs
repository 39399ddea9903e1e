//! Upstream forwarder
//!
//! Translates one inbound POST into one authenticated POST against the
//! configured LiteLLM base URL and relays the upstream answer unchanged.

use axum::{
    body::Body,
    http::{HeaderMap, Response},
};
use bytes::Bytes;
use tracing::Instrument;

use crate::{
    config::Config,
    error::AppResult,
    proxy::{
        headers::{build_outbound_headers, relay_response_headers, InjectedCredentials},
        logging::RequestContext,
    },
};

/// Forwards requests to the single configured upstream
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: String,
    credentials: InjectedCredentials,
}

impl Forwarder {
    /// Create a new forwarder
    pub fn new(client: reqwest::Client, config: &Config) -> AppResult<Self> {
        Ok(Self {
            client,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            credentials: InjectedCredentials::from_config(config)?,
        })
    }

    /// Base URL with trailing slashes removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upstream URL for an inbound path (query string included, unmodified)
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Outbound header set for an inbound request
    pub fn outbound_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        build_outbound_headers(inbound, &self.credentials)
    }

    /// Forward a POST body to upstream and relay the response
    ///
    /// Upstream HTTP error statuses are relayed like any other response;
    /// only transport failures become an error.
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        path_and_query: &str,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> AppResult<Response<Body>> {
        let url = self.target_url(path_and_query);
        let headers = self.outbound_headers(inbound_headers);

        ctx.log_upstream_request(&url, body.len());

        let result = self
            .exchange(ctx, &url, headers, body)
            .instrument(ctx.create_span())
            .await;

        if let Err(e) = &result {
            ctx.log_connection_error(&e.to_string(), &url);
        }

        result
    }

    async fn exchange(
        &self,
        ctx: &RequestContext,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Response<Body>> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let upstream_headers = response.headers().clone();
        let bytes = response.bytes().await?;

        ctx.log_upstream_response(status, bytes.len());

        let mut relayed = Response::new(Body::from(bytes));
        *relayed.status_mut() = status;
        *relayed.headers_mut() = relay_response_headers(&upstream_headers);

        Ok(relayed)
    }
}
