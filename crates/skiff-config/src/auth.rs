//! Credential handling configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default wait for the browser redirect, in seconds.
const fn default_callback_timeout_secs() -> u64 {
    300
}

/// Where the credential is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Settings file only.
    #[default]
    File,
    /// OS keychain, falling back to the settings file when unavailable.
    Keyring,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Seconds to wait for the browser callback. `0` waits forever.
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,

    #[serde(default)]
    pub store: StoreBackend,

    /// Overrides the directory holding `settings.json`.
    #[serde(default)]
    pub credentials_dir: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            callback_timeout_secs: default_callback_timeout_secs(),
            store: StoreBackend::default(),
            credentials_dir: None,
        }
    }
}

impl AuthConfig {
    /// Callback deadline, or `None` when configured to wait indefinitely.
    #[must_use]
    pub const fn callback_timeout(&self) -> Option<Duration> {
        match self.callback_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Resolve the settings directory: explicit override, else `<config_dir>/skiff`.
    #[must_use]
    pub fn credentials_dir(&self) -> Option<PathBuf> {
        self.credentials_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|p| p.join("skiff")))
    }
}
