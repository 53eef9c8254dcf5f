//! Browser login orchestration.
//!
//! 1. Validate any stored credential; a valid one short-circuits the flow
//! 2. Start the callback server on an OS-assigned port
//! 3. Open the browser to the login page and start the version probe
//! 4. Wait for the credential (bounded by the callback timeout and cancellation)
//! 5. Stop the server, then persist the credential
//! 6. Join the version probe and report whether an update exists

use std::future::Future;
use std::time::Duration;

use crate::api::ApiClient;
use crate::browser::{self, BrowserLauncher};
use crate::callback::{CallbackServer, CredentialReceiver};
use crate::error::AuthError;
use crate::token_store::TokenStore;
use crate::version::{UpdateNotice, VersionProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    CheckingExistingCredential,
    AwaitingCallback,
    Persisting,
    ReportingOutcome,
    Done,
}

/// Terminal result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The stored credential validated; nothing was started.
    AlreadyAuthenticated,
    /// The browser flow completed and its credential was persisted.
    LoggedIn {
        /// `false` when the callback carried an empty credential.
        token_stored: bool,
        update: Option<UpdateNotice>,
    },
}

/// One login attempt. Borrowed collaborators are owned by the caller.
pub struct LoginFlow<'a> {
    store: &'a dyn TokenStore,
    api: &'a ApiClient,
    browser: &'a dyn BrowserLauncher,
    login_url: String,
    current_version: String,
    callback_timeout: Option<Duration>,
}

impl<'a> LoginFlow<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn TokenStore,
        api: &'a ApiClient,
        browser: &'a dyn BrowserLauncher,
        login_url: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            api,
            browser,
            login_url: login_url.into(),
            current_version: current_version.into(),
            callback_timeout: None,
        }
    }

    /// Give up waiting for the browser after `timeout`. `None` waits forever.
    #[must_use]
    pub const fn with_callback_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.callback_timeout = timeout;
        self
    }

    /// Run the flow with no external cancellation.
    ///
    /// # Errors
    ///
    /// See [`Self::run_until`].
    pub async fn run(&self) -> Result<LoginOutcome, AuthError> {
        self.run_until(std::future::pending()).await
    }

    /// Run the flow, abandoning the callback wait when `cancel` resolves.
    ///
    /// # Errors
    ///
    /// - `AuthError::Persistence` if the store cannot be read or written
    /// - `AuthError::Template` / `AuthError::PortAllocation` if the callback
    ///   server cannot start
    /// - `AuthError::InvalidLoginUrl` if the configured login page does not parse
    /// - `AuthError::CallbackTimeout` / `AuthError::Cancelled` if the wait ends
    ///   without a credential
    pub async fn run_until<C>(&self, cancel: C) -> Result<LoginOutcome, AuthError>
    where
        C: Future<Output = ()>,
    {
        tracing::debug!(stage = ?Stage::CheckingExistingCredential);
        let existing = self.store.token()?;
        if self.api.is_token_valid(&existing).await {
            tracing::debug!(stage = ?Stage::Done, "stored credential still valid");
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        eprintln!("Waiting for authentication...");
        tracing::debug!(stage = ?Stage::AwaitingCallback);
        let (mut server, receiver) = CallbackServer::start()?;
        let url = browser::begin_auth(
            self.browser,
            &self.login_url,
            server.port(),
            &mut std::io::stderr(),
        )?;
        tracing::debug!(%url, port = server.port(), "login page requested");

        let probe = VersionProbe::spawn(self.api.clone(), self.current_version.clone());

        // Early returns drop `server`, which stops it.
        let jwt = self.wait_for_credential(receiver, cancel).await?;

        tracing::debug!(stage = ?Stage::Persisting);
        server.stop();
        if jwt.is_empty() {
            tracing::warn!("login callback carried an empty credential");
        }
        self.store.set_token(&jwt)?;

        tracing::debug!(stage = ?Stage::ReportingOutcome);
        let latest = probe.join().await;
        let update = UpdateNotice::compare(&self.current_version, &latest);

        tracing::debug!(stage = ?Stage::Done, update = update.is_some());
        Ok(LoginOutcome::LoggedIn {
            token_stored: !jwt.is_empty(),
            update,
        })
    }

    async fn wait_for_credential<C>(
        &self,
        receiver: CredentialReceiver,
        cancel: C,
    ) -> Result<String, AuthError>
    where
        C: Future<Output = ()>,
    {
        let delivered = async { receiver.await.map_err(|_| AuthError::CallbackClosed) };
        let bounded = async {
            match self.callback_timeout {
                Some(limit) => tokio::time::timeout(limit, delivered)
                    .await
                    .map_err(|_| AuthError::CallbackTimeout(limit.as_secs()))?,
                None => delivered.await,
            }
        };

        tokio::select! {
            result = bounded => result,
            () = cancel => Err(AuthError::Cancelled),
        }
    }
}

impl std::fmt::Debug for LoginFlow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("login_url", &self.login_url)
            .field("current_version", &self.current_version)
            .field("callback_timeout", &self.callback_timeout)
            .finish_non_exhaustive()
    }
}
