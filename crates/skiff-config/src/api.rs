//! Remote platform endpoints.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigError;

fn default_base_url() -> String {
    "https://api.skiff.dev".to_string()
}

fn default_login_url() -> String {
    "https://app.skiff.dev/cli-login".to_string()
}

/// Default timeout for a single remote request, in seconds.
const fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API root for token validation and release lookups.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Browser login page. The CLI appends `port` and `redirect` to it.
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Upper bound for each remote request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_url: default_login_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Check that both endpoints are absolute http(s) URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("api.base_url", &self.base_url)?;
        check_http_url("api.login_url", &self.login_url)?;
        Ok(())
    }

    /// Request timeout as a [`std::time::Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("{value:?} is not a valid URL: {e}"),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(())
}
