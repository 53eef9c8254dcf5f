use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "skiff-cli";
const KEYRING_USER: &str = "token";
const SETTINGS_FILE_NAME: &str = "settings.json";
const TOKEN_KEY: &str = "token";

/// Persisted credential. An empty string means "logged out".
pub trait TokenStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if the backing store cannot be read.
    fn token(&self) -> Result<String, AuthError>;

    /// Replace the stored credential. An empty `token` clears it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if the write fails. The previously
    /// stored value is left intact.
    fn set_token(&self, token: &str) -> Result<(), AuthError>;
}

/// Credential kept under the `token` key of a JSON settings file.
///
/// Other keys in the file are preserved. Writes land in a sibling temp file
/// first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store backed by `<dir>/settings.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_settings(&self) -> Result<Map<String, Value>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(AuthError::Persistence(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AuthError::Persistence(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(AuthError::Persistence(format!(
                "parse {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_settings(&self, settings: &Map<String, Value>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent()
            && !parent.is_dir()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::Persistence(format!("mkdir {}: {e}", parent.display()))
            })?;
            // Only a directory created here is locked down; an existing one keeps its mode.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        let body = serde_json::to_string_pretty(settings)
            .map_err(|e| AuthError::Persistence(format!("serialize settings: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| AuthError::Persistence(format!("write {}: {e}", tmp.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(|e| AuthError::Persistence(format!("chmod {}: {e}", tmp.display())))?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AuthError::Persistence(format!("replace {}: {e}", self.path.display()))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Result<String, AuthError> {
        let settings = self.read_settings()?;
        Ok(settings
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        // A corrupt file fails the read, so it is never silently overwritten.
        let mut settings = self.read_settings()?;
        if token.is_empty() {
            settings.remove(TOKEN_KEY);
        } else {
            settings.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        }
        self.write_settings(&settings)
    }
}

/// OS keychain store. Falls back to a [`FileTokenStore`] when the keychain is
/// unavailable.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    fallback: FileTokenStore,
}

impl KeyringTokenStore {
    /// Keychain service defaults to `"skiff-cli"`. Override via
    /// `SKIFF_KEYRING_SERVICE` to keep tests away from real credentials.
    #[must_use]
    pub fn new(fallback: FileTokenStore) -> Self {
        let service = std::env::var("SKIFF_KEYRING_SERVICE")
            .unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string());
        Self { service, fallback }
    }

    fn entry(&self) -> Option<keyring::Entry> {
        match keyring::Entry::new(&self.service, KEYRING_USER) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!(%error, "keyring unavailable; using settings file");
                None
            }
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn token(&self) -> Result<String, AuthError> {
        if let Some(entry) = self.entry() {
            match entry.get_password() {
                Ok(token) if !token.is_empty() => return Ok(token),
                Ok(_) | Err(keyring::Error::NoEntry) => {}
                Err(error) => tracing::warn!(%error, "keyring read failed; using settings file"),
            }
        }
        self.fallback.token()
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        let Some(entry) = self.entry() else {
            return self.fallback.set_token(token);
        };

        if token.is_empty() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(error) => tracing::warn!(%error, "keyring delete failed"),
            }
            return self.fallback.set_token("");
        }

        match entry.set_password(token) {
            Ok(()) => Ok(()),
            Err(error) => {
                tracing::warn!(%error, "keyring store failed; falling back to settings file");
                self.fallback.set_token(token)
            }
        }
    }
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<String>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Result<String, AuthError> {
        self.token
            .lock()
            .map(|t| t.clone())
            .map_err(|e| AuthError::Persistence(format!("store lock poisoned: {e}")))
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| AuthError::Persistence(format!("store lock poisoned: {e}")))?;
        *guard = token.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_reads_as_logged_out() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::in_dir(tmp.path().join("nested"));
        assert_eq!(store.token().expect("read"), "");
    }

    #[test]
    fn file_store_set_read_clear_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::in_dir(tmp.path().join("skiff"));

        store.set_token("test_jwt_abc123").expect("store");
        assert_eq!(store.token().expect("read"), "test_jwt_abc123");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path())
                .expect("metadata")
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600, "settings file should be 0600");
        }

        store.set_token("").expect("clear");
        assert_eq!(store.token().expect("read"), "");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn created_dir_is_private_but_existing_dir_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let mode = |path: &Path| {
            std::fs::metadata(path)
                .expect("metadata")
                .permissions()
                .mode()
                & 0o777
        };

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let shared = tmp.path().join("shared");
        std::fs::create_dir(&shared).expect("mkdir");
        std::fs::set_permissions(&shared, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        FileTokenStore::in_dir(&shared).set_token("abc").expect("store");
        assert_eq!(mode(&shared), 0o755);

        let fresh = shared.join("skiff");
        FileTokenStore::in_dir(&fresh).set_token("abc").expect("store");
        assert_eq!(mode(&fresh), 0o700);
    }

    #[test]
    fn unrelated_settings_survive_token_writes() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::in_dir(tmp.path());
        std::fs::write(store.path(), r#"{"organization": "acme"}"#).expect("seed");

        store.set_token("abc").expect("store");

        let raw = std::fs::read_to_string(store.path()).expect("read");
        let value: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["organization"], "acme");
        assert_eq!(value["token"], "abc");
    }

    #[test]
    fn corrupt_file_is_not_overwritten() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::in_dir(tmp.path());
        std::fs::write(store.path(), "{ definitely not json").expect("seed");

        let err = store.set_token("abc").expect_err("corrupt file must fail");
        assert!(matches!(err, AuthError::Persistence(_)));
        assert_eq!(
            std::fs::read_to_string(store.path()).expect("read"),
            "{ definitely not json"
        );
    }

    #[test]
    fn whitespace_only_file_reads_as_logged_out() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileTokenStore::in_dir(tmp.path());
        std::fs::write(store.path(), "   \n  ").expect("seed");
        assert_eq!(store.token().expect("read"), "");
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::with_token("seed");
        assert_eq!(store.token().expect("read"), "seed");
        store.set_token("").expect("clear");
        assert_eq!(store.token().expect("read"), "");
    }
}
