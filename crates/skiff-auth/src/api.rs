use std::time::Duration;

use crate::error::AuthError;

const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));

/// Thin HTTP client for the skiff platform API.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client rooted at `base_url`. Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the underlying client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Http(format!("build client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a `GET` against `path`, optionally carrying a bearer credential.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from `reqwest`. Non-2xx statuses are returned
    /// as responses, not errors.
    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Result<reqwest::Response> {
        let mut request = self.http.get(format!("{}{path}", self.base_url));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    /// Ask the platform whether `token` is still accepted.
    ///
    /// An empty token is never valid and never hits the network. Transport
    /// errors count as "not valid".
    pub async fn is_token_valid(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }

        match self.get("/v2/validate/token", Some(token)).await {
            Ok(resp) => {
                let valid = resp.status() == reqwest::StatusCode::OK;
                tracing::debug!(status = %resp.status(), valid, "validated stored token");
                valid
            }
            Err(error) => {
                tracing::debug!(%error, "token validation request failed");
                false
            }
        }
    }
}
