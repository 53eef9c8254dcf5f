//! Ephemeral localhost server that receives the credential from the browser redirect.
//!
//! The server binds `127.0.0.1:0`, serves every request on a background thread,
//! and hands the first `jwt` query value it sees to a oneshot channel. Repeat
//! hits still get the confirmation page but deliver nothing.

use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::oneshot;

use crate::error::AuthError;

const CONFIRMATION_TEMPLATE: &str = include_str!("../assets/callback.html");
const USERNAME_PLACEHOLDER: &str = "{{username}}";

/// Confirmation page split around its `{{username}}` placeholders.
#[derive(Debug, Clone)]
pub struct ConfirmationPage {
    segments: Vec<String>,
}

impl ConfirmationPage {
    /// Prepare a page template.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Template` if the source has no `{{username}}` slot or
    /// an unterminated `{{` tag.
    pub fn parse(source: &str) -> Result<Self, AuthError> {
        let segments: Vec<String> = source
            .split(USERNAME_PLACEHOLDER)
            .map(str::to_string)
            .collect();

        if segments.len() < 2 {
            return Err(AuthError::Template(format!(
                "template has no {USERNAME_PLACEHOLDER} placeholder"
            )));
        }
        if let Some(stray) = segments.iter().find(|s| s.contains("{{")) {
            let at = stray.find("{{").unwrap_or_default();
            let tag: String = stray[at..].chars().take(24).collect();
            return Err(AuthError::Template(format!("unknown template tag near {tag:?}")));
        }

        Ok(Self { segments })
    }

    /// The page bundled with the binary.
    ///
    /// # Errors
    ///
    /// See [`Self::parse`].
    pub fn bundled() -> Result<Self, AuthError> {
        Self::parse(CONFIRMATION_TEMPLATE)
    }

    #[must_use]
    pub fn render(&self, username: &str) -> String {
        self.segments.join(&escape_html(username))
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Query values the login page redirects with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub jwt: String,
    pub username: String,
}

impl CallbackParams {
    /// Extract `jwt` and `username` from a request target such as `/?jwt=a&username=b`.
    ///
    /// Missing parameters come back empty. A repeated parameter keeps its
    /// first value, even when that value is empty.
    #[must_use]
    pub fn from_request_url(target: &str) -> Self {
        let Some((_, query)) = target.split_once('?') else {
            return Self::default();
        };

        let mut jwt = None;
        let mut username = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "jwt" if jwt.is_none() => jwt = Some(value.into_owned()),
                "username" if username.is_none() => username = Some(value.into_owned()),
                _ => {}
            }
        }

        Self {
            jwt: jwt.unwrap_or_default(),
            username: username.unwrap_or_default(),
        }
    }
}

/// Receiving end of the single-credential channel.
pub type CredentialReceiver = oneshot::Receiver<String>;

/// Owned handle to a running callback server.
///
/// Dropping the handle stops the server; [`CallbackServer::stop`] does the same
/// explicitly and may be called any number of times.
pub struct CallbackServer {
    port: u16,
    server: Option<Arc<tiny_http::Server>>,
    worker: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind an OS-assigned port and start serving in the background.
    ///
    /// Returns as soon as the listener is bound and the serving thread is running.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Template` if the confirmation page cannot be prepared
    /// and `AuthError::PortAllocation` if no local port can be bound.
    pub fn start() -> Result<(Self, CredentialReceiver), AuthError> {
        Self::start_with_page(ConfirmationPage::bundled()?)
    }

    /// Like [`Self::start`] with a caller-supplied confirmation page.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PortAllocation` if no local port can be bound.
    pub fn start_with_page(page: ConfirmationPage) -> Result<(Self, CredentialReceiver), AuthError> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|e| AuthError::PortAllocation(format!("failed to bind: {e}")))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .ok_or_else(|| AuthError::PortAllocation("listener has no IP address".into()))?;

        let server = Arc::new(server);
        let (sender, receiver) = oneshot::channel();

        let worker = std::thread::Builder::new()
            .name(format!("skiff-callback-{port}"))
            .spawn({
                let server = Arc::clone(&server);
                move || serve(&server, &page, sender)
            })
            .map_err(|e| AuthError::PortAllocation(format!("failed to spawn server thread: {e}")))?;

        tracing::debug!(port, "callback server listening");

        Ok((
            Self {
                port,
                server: Some(server),
                worker: Some(worker),
            },
            receiver,
        ))
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Stop serving, finish the request in flight, and release the port.
    pub fn stop(&mut self) {
        let Some(server) = self.server.take() else {
            return;
        };

        server.unblock();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!(port = self.port, "callback server thread panicked");
        }
        drop(server);

        tracing::debug!(port = self.port, "callback server stopped");
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CallbackServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackServer")
            .field("port", &self.port)
            .field("running", &self.is_running())
            .finish()
    }
}

fn serve(server: &tiny_http::Server, page: &ConfirmationPage, sender: oneshot::Sender<String>) {
    let mut sender = Some(sender);

    // Ends once `unblock` is called from `CallbackServer::stop`.
    for request in server.incoming_requests() {
        let params = CallbackParams::from_request_url(request.url());

        match sender.take() {
            Some(tx) => {
                if tx.send(params.jwt).is_err() {
                    tracing::debug!("credential receiver already dropped");
                }
            }
            None => tracing::debug!(url = request.url(), "ignoring repeat callback"),
        }

        let mut response =
            tiny_http::Response::from_data(page.render(&params.username).into_bytes()).with_status_code(200);
        if let Ok(header) = "Content-Type: text/html; charset=utf-8".parse::<tiny_http::Header>() {
            response = response.with_header(header);
        }
        if let Err(error) = request.respond(response) {
            tracing::debug!(%error, "failed to write confirmation page");
        }
    }
}
