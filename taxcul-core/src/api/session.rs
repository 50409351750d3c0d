//! The signed-in user's API token.
//!
//! The token is the only state shared between requests. It is read before
//! each authenticated call, replaced on login, and cleared on logout or when
//! the backend answers 401. [`Session`] is handed to the HTTP client
//! explicitly so tests can substitute an in-memory store.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "auth_token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed session file '{path}': {message}")]
    Format { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Somewhere to keep the token between requests (and, for some stores,
/// between runs).
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn store(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the token for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(
        &self,
        token: &str,
    ) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Persists the token as `auth_token = "..."` in a small TOML file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(
        &self,
        source: io::Error,
    ) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Replaces the file at `path` with `text`, owner read/write only on unix.
/// A file left by an earlier version with wider permissions is narrowed too.
fn write_private(
    path: &Path,
    text: &str,
) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(text.as_bytes())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: SessionFile = toml::from_str(&text).map_err(|e| SessionError::Format {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        Ok(file.auth_token.filter(|t| !t.is_empty()))
    }

    fn store(
        &self,
        token: &str,
    ) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let text = toml::to_string(&SessionFile {
            auth_token: Some(token.to_string()),
        })
        .map_err(|e| SessionError::Format {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        write_private(&self.path, &text).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Handle on the current token, cheap to clone and share between clients.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// An in-memory session that starts signed in.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryTokenStore::with_token(token)))
    }

    /// The current token. A store that cannot be read counts as signed out.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "cannot read session token; continuing signed out");
                None
            }
        }
    }

    /// Value for the `Authorization` header, if signed in.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(
        &self,
        token: &str,
    ) -> Result<(), SessionError> {
        debug!("storing session token");
        self.store.store(token)
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        debug!("clearing session token");
        self.store.clear()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for Session {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
