//! Terminal front-end: each subcommand is a thin view over the same API
//! client the dashboard uses, with backend cookies kept in a session file.

pub mod auth;
pub mod catalog;
pub mod instances;
pub mod profile;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use yansi::Paint;

use crate::api::{auth as auth_api, ApiClient, ApiError};
use crate::config::{ConfigError, Settings};
use crate::forms::FormErrors;
use crate::models::SessionUser;
use crate::session::{SessionContext, SessionFile, SessionFileError, StoredSession};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.page_message())]
    Api(#[from] ApiError),
    #[error(transparent)]
    SessionFile(#[from] SessionFileError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not logged in. Run `synapse login` first.")]
    NotLoggedIn,
    #[error("Admin access required.")]
    NotStaff,
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Render form errors the way the pages do: banner first, then fields.
    pub fn from_form(errors: &FormErrors) -> Self {
        let mut lines = Vec::new();
        if let Some(banner) = errors.banner_text() {
            lines.push(banner.to_string());
        }
        for (field, messages) in &errors.fields {
            lines.push(format!("  {}: {}", field, messages.join(" ")));
        }
        CliError::Form(lines.join("\n"))
    }
}

/// Per-invocation state: settings, the restored backend client and the
/// identity it resolves to.
pub struct CliContext {
    pub settings: Settings,
    pub api: ApiClient,
    pub identity: SessionContext,
    session_file: SessionFile,
}

impl CliContext {
    pub fn load(settings: Settings) -> Result<Self, CliError> {
        let session_file = SessionFile::new(settings.session_file.clone());
        let (api, stored) = session_file.restore_client(&settings.api_base_url)?;
        let identity = SessionContext::new();
        if let Some(user) = stored.and_then(|s| s.user) {
            identity.set(user);
        }
        Ok(Self {
            settings,
            api,
            identity,
            session_file,
        })
    }

    /// Confirm the stored session with the backend.
    pub async fn require_login(&self) -> Result<SessionUser, CliError> {
        match self.identity.bootstrap(&self.api).await? {
            Some(user) => Ok(user),
            None => Err(CliError::NotLoggedIn),
        }
    }

    pub async fn require_staff(&self) -> Result<SessionUser, CliError> {
        let user = self.require_login().await?;
        if user.is_staff {
            Ok(user)
        } else {
            Err(CliError::NotStaff)
        }
    }

    pub fn persist(&self) -> Result<(), CliError> {
        let stored = StoredSession::capture(&self.api, self.identity.current());
        self.session_file.save(&stored)?;
        tracing::debug!(path = %self.session_file.path().display(), "session saved");
        Ok(())
    }

    pub fn forget(&self) -> Result<(), CliError> {
        self.identity.invalidate();
        self.session_file.clear()?;
        Ok(())
    }

    /// Run a request, dropping the saved identity when the backend says 401.
    pub fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, CliError> {
        self.identity.observe(&result);
        if matches!(&result, Err(e) if e.is_unauthorized()) {
            if let Err(e) = self.session_file.clear() {
                tracing::warn!(error = %e, "could not clear session file");
            }
            return Err(CliError::NotLoggedIn);
        }
        result.map_err(CliError::from)
    }

    pub async fn whoami(&self) -> Result<SessionUser, CliError> {
        let result = auth_api::fetch_profile(&self.api).await;
        self.observe(result)
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn success(message: impl std::fmt::Display) {
    println!("{}", message.to_string().green());
}

pub fn warn(message: impl std::fmt::Display) {
    println!("{}", message.to_string().yellow());
}
