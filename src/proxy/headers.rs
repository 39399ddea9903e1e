//! Header utilities for upstream forwarding
//!
//! Outbound requests carry a fixed allow-list of headers. Nothing else the
//! client sent (cookies, Host, Content-Length, custom headers) is forwarded.

use axum::http::header::{self, HeaderName};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    config::{Config, USER_EMAIL_KEY, USER_KEY_KEY},
    error::{AppError, AppResult},
};

/// Header carrying the LiteLLM user key
pub const X_USER_KEY: HeaderName = HeaderName::from_static("x-user-key");
/// Header carrying the Open WebUI user email
pub const X_OPENWEBUI_USER_EMAIL: HeaderName = HeaderName::from_static("x-openwebui-user-email");

/// Content type used when the client did not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Hop-by-hop headers owned by the local HTTP layer
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Credentials injected into every outbound request
///
/// Converted to header values once at startup so a malformed key is
/// reported before the proxy starts serving.
#[derive(Debug, Clone)]
pub struct InjectedCredentials {
    user_key: HeaderValue,
    user_email: HeaderValue,
}

impl InjectedCredentials {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let mut user_key = HeaderValue::from_str(&config.user_key).map_err(|_| {
            AppError::InvalidConfig(format!("{} contains invalid header characters", USER_KEY_KEY))
        })?;
        user_key.set_sensitive(true);

        let user_email = HeaderValue::from_str(&config.user_email).map_err(|_| {
            AppError::InvalidConfig(format!(
                "{} contains invalid header characters",
                USER_EMAIL_KEY
            ))
        })?;

        Ok(Self {
            user_key,
            user_email,
        })
    }
}

/// Build the outbound header set from the inbound request headers
///
/// The result always holds exactly four headers:
/// - `Content-Type`: inbound value, or `application/json`
/// - `Authorization`: inbound value, or the empty string
/// - `X-User-Key` and `X-OpenWebUi-User-Email`: from configuration
pub fn build_outbound_headers(inbound: &HeaderMap, credentials: &InjectedCredentials) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);

    headers.insert(
        CONTENT_TYPE,
        inbound
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(
        AUTHORIZATION,
        inbound
            .get(AUTHORIZATION)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("")),
    );
    headers.insert(X_USER_KEY, credentials.user_key.clone());
    headers.insert(X_OPENWEBUI_USER_EMAIL, credentials.user_email.clone());

    headers
}

/// Check if a header is a hop-by-hop header that should not be relayed
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name) || name.as_str() == "keep-alive"
}

/// Copy upstream response headers for the client
///
/// Order and repeated values are preserved. Hop-by-hop headers
/// (`connection`, `transfer-encoding`, `keep-alive`, ...) are dropped because
/// the local server re-frames the body. The local server also adds
/// `content-length` and `date` when upstream did not send them, so the relayed
/// header set is a superset of upstream's end-to-end headers rather than a
/// byte-for-byte copy.
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if !is_hop_by_hop_header(name) {
            relayed.append(name.clone(), value.clone());
        }
    }

    relayed
}
