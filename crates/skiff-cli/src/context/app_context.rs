use anyhow::Context;
use skiff_auth::{ApiClient, FileTokenStore, KeyringTokenStore, TokenStore};
use skiff_config::{SkiffConfig, StoreBackend};

/// Version compared against the latest published release.
pub const CURRENT_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Shared resources for command handlers, built once per invocation.
pub struct AppContext {
    pub config: SkiffConfig,
    pub store: Box<dyn TokenStore>,
    pub api: ApiClient,
}

impl AppContext {
    pub fn init(config: SkiffConfig) -> anyhow::Result<Self> {
        let store = open_store(&config)?;
        let api = ApiClient::new(&config.api.base_url, config.api.request_timeout())
            .context("failed to build platform API client")?;

        Ok(Self { config, store, api })
    }
}

fn open_store(config: &SkiffConfig) -> anyhow::Result<Box<dyn TokenStore>> {
    let dir = config.auth.credentials_dir().context(
        "cannot determine the config directory; set SKIFF_AUTH__CREDENTIALS_DIR",
    )?;
    let file = FileTokenStore::in_dir(dir);
    tracing::debug!(path = %file.path().display(), backend = ?config.auth.store, "credential store");

    Ok(match config.auth.store {
        StoreBackend::File => Box::new(file),
        StoreBackend::Keyring => Box::new(KeyringTokenStore::new(file)),
    })
}
