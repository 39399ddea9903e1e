//! Proxy module
//!
//! Handles request forwarding to the LiteLLM upstream.

pub mod forwarder;
pub mod headers;
pub mod logging;

pub use forwarder::Forwarder;
pub use logging::RequestContext;
