//! Best-effort "is there a newer release?" check.
//!
//! The probe never fails its caller: every error resolves to the version the
//! caller is already running, which reads as "up to date".

use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::api::ApiClient;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed release body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("release body has an empty version")]
    EmptyVersion,
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    latest: String,
}

/// Fetch the latest published version.
///
/// # Errors
///
/// Returns `ProbeError` on transport errors, non-200 statuses, undecodable
/// bodies, or an empty `latest` field.
pub async fn fetch_latest(api: &ApiClient) -> Result<String, ProbeError> {
    let resp = api.get("/releases/latest", None).await?;
    if resp.status() != reqwest::StatusCode::OK {
        return Err(ProbeError::Status(resp.status()));
    }

    let body = resp.bytes().await?;
    let release: LatestRelease = serde_json::from_slice(&body)?;
    if release.latest.is_empty() {
        return Err(ProbeError::EmptyVersion);
    }
    Ok(release.latest)
}

/// Latest published version, or `current` when it cannot be determined.
pub async fn latest_or_current(api: &ApiClient, current: &str) -> String {
    match fetch_latest(api).await {
        Ok(latest) => latest,
        Err(error) => {
            tracing::debug!(%error, "version probe failed; assuming current version");
            current.to_string()
        }
    }
}

/// A version probe running on the tokio runtime.
///
/// Dropping the probe before [`VersionProbe::join`] aborts it.
#[derive(Debug)]
pub struct VersionProbe {
    task: Option<JoinHandle<String>>,
    current: String,
}

impl VersionProbe {
    /// Start the probe in the background.
    #[must_use]
    pub fn spawn(api: ApiClient, current: impl Into<String>) -> Self {
        let current = current.into();
        let task = tokio::spawn({
            let current = current.clone();
            async move { latest_or_current(&api, &current).await }
        });

        Self {
            task: Some(task),
            current,
        }
    }

    /// Wait for the probe's answer.
    pub async fn join(mut self) -> String {
        let Some(task) = self.task.take() else {
            return self.current.clone();
        };

        match task.await {
            Ok(version) => version,
            Err(error) => {
                tracing::debug!(%error, "version probe task did not complete");
                self.current.clone()
            }
        }
    }
}

impl Drop for VersionProbe {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// A newer release than the one running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotice {
    pub current: String,
    pub latest: String,
}

impl UpdateNotice {
    /// `Some` when `latest` differs from `current`.
    #[must_use]
    pub fn compare(current: &str, latest: &str) -> Option<Self> {
        (current != latest).then(|| Self {
            current: current.to_string(),
            latest: latest.to_string(),
        })
    }
}
