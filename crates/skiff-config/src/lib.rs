//! # skiff-config
//!
//! Layered configuration loading for skiff using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKIFF_*` prefix, `__` as separator)
//! 2. External overrides handed to [`SkiffConfig::load_with_env_overrides`]
//! 3. Project-level `.skiff/config.toml`
//! 4. User-level `~/.config/skiff/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKIFF_API__BASE_URL` -> `api.base_url`,
//! `SKIFF_AUTH__CALLBACK_TIMEOUT_SECS` -> `auth.callback_timeout_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use skiff_config::SkiffConfig;
//!
//! let config = SkiffConfig::load().expect("config");
//! println!("API: {}", config.api.base_url);
//! ```

mod api;
mod auth;
mod error;

pub use api::ApiConfig;
pub use auth::{AuthConfig, StoreBackend};
pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment prefix shared by env vars and external overrides.
pub const ENV_PREFIX: &str = "SKIFF_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SkiffConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl SkiffConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// `.env` files are the caller's concern; load them before calling this.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or an endpoint is not a valid URL.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env_overrides(&[])
    }

    /// Load configuration with extra `SKIFF_*` key/value pairs layered below
    /// the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_env_overrides(overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_with_overrides(overrides).extract()?;
        config.api.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_with_overrides(&[])
    }

    fn figment_with_overrides(overrides: &[(String, String)]) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".skiff/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: External overrides
        for (key, value) in overrides {
            let Some(path) = env_key_to_path(key) else {
                continue;
            };
            let value: Value = value.parse().unwrap_or_else(|_| Value::from(value.clone()));
            figment = figment.merge((path, value));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skiff").join("config.toml"))
    }
}

/// Map `SKIFF_API__BASE_URL` to `api.base_url`. Keys without the prefix are ignored.
fn env_key_to_path(key: &str) -> Option<String> {
    let rest = key.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase().replace("__", "."))
}
