use std::io::Write;

use url::Url;

use crate::error::AuthError;

/// Opens URLs for the user.
pub trait BrowserLauncher: Send + Sync {
    /// # Errors
    ///
    /// Returns the OS error when no browser could be launched.
    fn open(&self, url: &Url) -> std::io::Result<()>;
}

/// Launches the system default browser via the `open` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &Url) -> std::io::Result<()> {
        open::that(url.as_str())
    }
}

/// Compose the remote login URL that redirects back to `port`.
///
/// Any query already present on `login_url` is replaced.
///
/// # Errors
///
/// Returns `AuthError::InvalidLoginUrl` if `login_url` does not parse.
pub fn login_url(login_url: &str, port: u16) -> Result<Url, AuthError> {
    let mut url = Url::parse(login_url)
        .map_err(|e| AuthError::InvalidLoginUrl(format!("{login_url:?}: {e}")))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("port", &port.to_string())
        .append_pair("redirect", "true");
    Ok(url)
}

/// Point the user's browser at the login page.
///
/// A launch failure is not an error: the URL is written to `notice` for the
/// user to open by hand and the flow carries on.
///
/// # Errors
///
/// Returns `AuthError::InvalidLoginUrl` if `base` does not parse.
pub fn begin_auth(
    browser: &dyn BrowserLauncher,
    base: &str,
    port: u16,
    notice: &mut dyn Write,
) -> Result<Url, AuthError> {
    let url = login_url(base, port)?;

    if let Err(error) = browser.open(&url) {
        tracing::debug!(%error, "failed to open browser");
        if let Err(error) = writeln!(notice, "Please open the following URL to login: {url}") {
            tracing::warn!(%error, %url, "failed to print login URL");
        }
    }

    Ok(url)
}
