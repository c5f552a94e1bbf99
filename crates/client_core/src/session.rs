//! Session token persistence, the console's stand-in for a browser cookie.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gateway::CatalogGateway;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, or `None` if nothing usable is stored.
    fn load(&self) -> Result<Option<StoredCredential>>;
    fn save(&self, credential: &StoredCredential) -> Result<()>;
}

/// JSON file holding a single `{token, expires_at}` record.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read credential file '{}'", self.path.display())
                })
            }
        };
        let credential = serde_json::from_str(&raw).with_context(|| {
            format!("malformed credential file '{}'", self.path.display())
        })?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &StoredCredential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "failed to create credential directory '{}'",
                        parent.display()
                    )
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, raw).with_context(|| {
            format!("failed to write credential file '{}'", self.path.display())
        })?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            inner: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, credential: &StoredCredential) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        *guard = Some(credential.clone());
        Ok(())
    }
}

/// Current session token, read once from the store when opened.
pub struct SessionStore {
    store: Box<dyn CredentialStore>,
    current: Option<StoredCredential>,
}

impl SessionStore {
    /// Loads the persisted credential. Unreadable or expired credentials are
    /// treated as absent.
    pub fn open(store: Box<dyn CredentialStore>) -> Self {
        let current = match store.load() {
            Ok(Some(credential)) if credential.is_expired_at(Utc::now()) => {
                info!("session: stored token expired at {}", credential.expires_at);
                None
            }
            Ok(credential) => credential,
            Err(err) => {
                warn!("session: ignoring unreadable credential: {err:#}");
                None
            }
        };
        Self { store, current }
    }

    pub fn get(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|credential| !credential.is_expired_at(Utc::now()))
            .map(|credential| credential.token.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|credential| credential.expires_at)
    }

    pub fn set(&mut self, token: impl Into<String>, expires_at: DateTime<Utc>) -> Result<()> {
        let credential = StoredCredential {
            token: token.into(),
            expires_at,
        };
        self.store.save(&credential)?;
        debug!("session: token persisted, expires_at={expires_at}");
        self.current = Some(credential);
        Ok(())
    }

    /// Asks the service whether the token is still good. Any failure counts
    /// as "not authenticated".
    pub async fn validate(&self, gateway: &dyn CatalogGateway) -> bool {
        let Some(token) = self.get() else {
            return false;
        };
        gateway.authorize(token).await;
        match gateway.validate_session().await {
            Ok(valid) => valid,
            Err(err) => {
                warn!("session: validation failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
