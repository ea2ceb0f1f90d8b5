use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{auth, ApiClient, ApiError};
use crate::models::SessionUser;

/// Shared, observable identity of the current backend session.
///
/// Set at bootstrap from the profile endpoint, replaced on login, cleared on
/// logout and whenever the backend answers 401.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    user: Arc<RwLock<Option<SessionUser>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().map(|u| u.is_authenticated).unwrap_or(false)
    }

    pub fn is_staff(&self) -> bool {
        self.current().map(|u| u.is_authenticated && u.is_staff).unwrap_or(false)
    }

    pub fn set(&self, user: SessionUser) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn invalidate(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Resolve the identity from the backend. 401/403 mean anonymous; other
    /// failures also leave the context anonymous but are returned.
    pub async fn bootstrap(&self, api: &ApiClient) -> Result<Option<SessionUser>, ApiError> {
        match auth::fetch_profile(api).await {
            Ok(user) if user.is_authenticated => {
                self.set(user.clone());
                Ok(Some(user))
            }
            Ok(_) => {
                self.invalidate();
                Ok(None)
            }
            Err(e) if matches!(e.status(), Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)) => {
                self.invalidate();
                Ok(None)
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }

    /// Drop the identity when a request came back 401.
    pub fn observe<T>(&self, result: &Result<T, ApiError>) {
        if let Err(e) = result {
            if e.is_unauthorized() {
                tracing::info!("backend session expired");
                self.invalidate();
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionFileError {
    #[error("Failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What the CLI keeps between invocations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub api_base_url: String,
    #[serde(default)]
    pub cookies: String,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl StoredSession {
    pub fn capture(api: &ApiClient, user: Option<SessionUser>) -> Self {
        Self {
            api_base_url: api.base_url().to_string(),
            cookies: api.cookie_header().unwrap_or_default(),
            user,
        }
    }
}

pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<StoredSession>, SessionFileError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionFileError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map(Some).map_err(|source| SessionFileError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file atomically so a crash never leaves half a session.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionFileError> {
        let write_err = |source| SessionFileError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let body = serde_json::to_vec_pretty(session).map_err(|e| write_err(e.into()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&body).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionFileError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Build a client for `base_url`, reusing stored cookies when they were
    /// issued by the same backend.
    pub fn restore_client(&self, base_url: &str) -> Result<(ApiClient, Option<StoredSession>), ApiError> {
        let api = ApiClient::new(base_url)?;
        let stored = match self.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session file");
                None
            }
        };
        let stored = stored.filter(|s| s.api_base_url == api.base_url());
        if let Some(s) = &stored {
            api.restore_cookies(&s.cookies);
        }
        Ok((api, stored))
    }
}
