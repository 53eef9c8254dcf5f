//! Shared fakes for the login flow tests.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use skiff_auth::{AuthError, BrowserLauncher, MemoryTokenStore, TokenStore};
use url::Url;

/// Send a `GET` to the local callback server and return the raw response.
pub fn get(port: u16, target: &str) -> std::io::Result<String> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let mut stream = TcpStream::connect_timeout(&addr, Duration::from_millis(500))?;
    stream.set_read_timeout(Some(Duration::from_millis(500)))?;
    write!(
        stream,
        "GET {target} HTTP/1.1\r\nHost: localhost:{port}\r\nConnection: close\r\n\r\n"
    )?;
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    Ok(response)
}

/// Whether a callback server on `port` still serves the confirmation page.
pub fn callback_answers(port: u16) -> bool {
    get(port, "/?jwt=late&username=probe").is_ok_and(|r| r.starts_with("HTTP/1.1 200"))
}

fn port_of(url: &Url) -> u16 {
    url.query_pairs()
        .find(|(k, _)| k == "port")
        .and_then(|(_, v)| v.parse().ok())
        .expect("login URL carries a port")
}

/// Stands in for the user: on `open`, replays the redirect(s) against the
/// callback port from a background thread.
#[derive(Default)]
pub struct ScriptedBrowser {
    pub redirects: Vec<String>,
    pub fail_to_open: bool,
    pub opened: Mutex<Vec<Url>>,
    pub port: Arc<Mutex<Option<u16>>>,
}

impl ScriptedBrowser {
    pub fn redirecting_to(targets: &[&str]) -> Self {
        Self {
            redirects: targets.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    /// A user who never completes the login.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail_to_open = true;
        self
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().expect("lock").clone()
    }

    pub fn last_port(&self) -> Option<u16> {
        *self.port.lock().expect("lock")
    }
}

impl BrowserLauncher for ScriptedBrowser {
    fn open(&self, url: &Url) -> std::io::Result<()> {
        let port = port_of(url);
        self.opened.lock().expect("lock").push(url.clone());
        *self.port.lock().expect("lock") = Some(port);

        let redirects = self.redirects.clone();
        std::thread::spawn(move || {
            // Later redirects may race the server shutdown; only the first must land.
            for target in redirects {
                let _ = get(port, &target);
            }
        });

        if self.fail_to_open {
            return Err(std::io::Error::other("no display available"));
        }
        Ok(())
    }
}

/// Memory store that records whether the callback server was still serving
/// at the moment of each write.
pub struct ObservingStore {
    inner: MemoryTokenStore,
    port: Arc<Mutex<Option<u16>>>,
    fail_writes: bool,
    pub server_alive_at_write: Mutex<Vec<bool>>,
    pub written_at: Mutex<Vec<Instant>>,
}

impl ObservingStore {
    pub fn new(initial: &str, browser: &ScriptedBrowser) -> Self {
        Self {
            inner: MemoryTokenStore::with_token(initial),
            port: Arc::clone(&browser.port),
            fail_writes: false,
            server_alive_at_write: Mutex::new(Vec::new()),
            written_at: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn writes_saw_server(&self) -> Vec<bool> {
        self.server_alive_at_write.lock().expect("lock").clone()
    }

    pub fn write_times(&self) -> Vec<Instant> {
        self.written_at.lock().expect("lock").clone()
    }
}

impl TokenStore for ObservingStore {
    fn token(&self) -> Result<String, AuthError> {
        self.inner.token()
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        let alive = self
            .port
            .lock()
            .expect("lock")
            .is_some_and(callback_answers);
        self.server_alive_at_write.lock().expect("lock").push(alive);
        self.written_at.lock().expect("lock").push(Instant::now());

        if self.fail_writes {
            return Err(AuthError::Persistence("disk full".into()));
        }
        self.inner.set_token(token)
    }
}
