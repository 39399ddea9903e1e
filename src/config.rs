//! Configuration management for the LiteLLM local proxy
//!
//! Configuration is read once at startup from a literal `key=value` file
//! (default `.auth.env`). Process environment variables with the same names take
//! precedence over the file, which keeps container deployments simple.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::AppError;

/// Default configuration file, relative to the working directory
pub const DEFAULT_ENV_FILE: &str = ".auth.env";
/// Environment variable that overrides the configuration file path
pub const ENV_FILE_VAR: &str = "LITELLM_PROXY_ENV_FILE";

pub const BASE_URL_KEY: &str = "LITELLM_BASE_URL";
pub const USER_KEY_KEY: &str = "LITELLM_USER_KEY";
pub const USER_EMAIL_KEY: &str = "LITELLM_USER_EMAIL";
pub const PORT_KEY: &str = "PROXY_PORT";
pub const TIMEOUT_KEY: &str = "PROXY_TIMEOUT_SECONDS";

const KNOWN_KEYS: &[&str] = &[
    BASE_URL_KEY,
    USER_KEY_KEY,
    USER_EMAIL_KEY,
    PORT_KEY,
    TIMEOUT_KEY,
];

pub const DEFAULT_BASE_URL: &str = "https://litellm.kickmaker.net/v1";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Application configuration
///
/// Immutable after load; shared read-only by every request handler.
#[derive(Clone)]
pub struct Config {
    /// Upstream LiteLLM base URL, requests are forwarded to `<base><path>`
    pub upstream_base_url: String,
    /// Value injected as `X-User-Key`
    pub user_key: String,
    /// Value injected as `X-OpenWebUi-User-Email`
    pub user_email: String,
    /// Loopback port to listen on
    pub listen_port: u16,
    /// Upper bound on a single upstream exchange (in seconds)
    pub upstream_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("user_key", &"<redacted>")
            .field("user_email", &self.user_email)
            .field("listen_port", &self.listen_port)
            .field("upstream_timeout_seconds", &self.upstream_timeout_seconds)
            .finish()
    }
}

impl Config {
    /// Load configuration from the env file and the process environment
    pub fn load() -> Result<Self> {
        let path = env::var(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENV_FILE));

        let mut values = read_env_file(&path)?;
        for key in KNOWN_KEYS {
            if let Ok(value) = env::var(key) {
                debug!(key = %key, "Configuration value overridden by environment");
                values.insert((*key).to_string(), value);
            }
        }

        Self::from_values(&values)
    }

    /// Build a configuration from already-parsed key/value pairs
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| values.get(key).map(|v| v.trim().to_string());

        Ok(Self {
            upstream_base_url: get(BASE_URL_KEY)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            user_key: get(USER_KEY_KEY).unwrap_or_default(),
            user_email: get(USER_EMAIL_KEY).unwrap_or_default(),
            listen_port: get(PORT_KEY)
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .context("Invalid PROXY_PORT")?,
            upstream_timeout_seconds: get(TIMEOUT_KEY)
                .unwrap_or_else(|| DEFAULT_TIMEOUT_SECONDS.to_string())
                .parse()
                .context("Invalid PROXY_TIMEOUT_SECONDS")?,
        })
    }

    /// Check that the credentials required to talk to upstream are present
    ///
    /// Must pass before any socket is bound.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_key.trim().is_empty() {
            return Err(AppError::MissingCredential(USER_KEY_KEY));
        }
        if self.user_email.trim().is_empty() {
            return Err(AppError::MissingCredential(USER_EMAIL_KEY));
        }
        reqwest::Url::parse(&self.upstream_base_url).map_err(|e| {
            AppError::InvalidConfig(format!(
                "{} is not a valid URL ({}): {}",
                BASE_URL_KEY, self.upstream_base_url, e
            ))
        })?;
        if self.upstream_timeout_seconds == 0 {
            return Err(AppError::InvalidConfig(format!(
                "{} must be greater than zero",
                TIMEOUT_KEY
            )));
        }
        Ok(())
    }
}

/// Read `key=value` pairs from an env file without exporting them
///
/// A missing file is not fatal: a warning is logged and an empty set is
/// returned so that defaults (and the credential check) apply.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                path = %path.display(),
                "Configuration file not found, copy .auth.env.template to .auth.env"
            );
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    Ok(parse_env_contents(&contents))
}

/// Parse `key=value` lines literally
///
/// Blank lines, `#` comments and lines without `=` are skipped. Keys and
/// values are trimmed; values are never unquoted or expanded, so a key
/// containing `$` or quotes reaches upstream exactly as written.
pub fn parse_env_contents(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}
