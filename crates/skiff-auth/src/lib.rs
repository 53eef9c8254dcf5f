//! # skiff-auth
//!
//! Browser-delegated authentication for the skiff CLI.
//!
//! Provides the localhost callback server (`tiny_http`), browser launch (`open`),
//! the concurrent release check, credential storage (settings file or OS
//! keychain via `keyring`), and the login orchestrator tying them together.

pub mod api;
pub mod browser;
pub mod callback;
pub mod error;
pub mod login;
pub mod token_store;
pub mod version;

pub use api::ApiClient;
pub use browser::{BrowserLauncher, SystemBrowser};
pub use error::AuthError;
pub use login::{LoginFlow, LoginOutcome};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use version::UpdateNotice;

/// Result of [`logout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// No credential was stored; nothing changed.
    AlreadyLoggedOut,
    LoggedOut,
}

/// Clear the stored credential. Never touches the network.
///
/// # Errors
///
/// Returns `AuthError::Persistence` if the store cannot be read or cleared.
pub fn logout(store: &dyn TokenStore) -> Result<LogoutOutcome, AuthError> {
    if store.token()?.is_empty() {
        return Ok(LogoutOutcome::AlreadyLoggedOut);
    }
    store.set_token("")?;
    Ok(LogoutOutcome::LoggedOut)
}

/// Return the stored credential if the platform still accepts it.
///
/// # Errors
///
/// Returns `AuthError::Unauthenticated` if no credential is stored or remote
/// validation rejects it, and `AuthError::Persistence` if the store cannot be read.
pub async fn current_token(store: &dyn TokenStore, api: &ApiClient) -> Result<String, AuthError> {
    let token = store.token()?;
    if !api.is_token_valid(&token).await {
        return Err(AuthError::Unauthenticated);
    }
    Ok(token)
}
