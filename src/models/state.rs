use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::reconcile::{InstanceBoard, RefreshSchedule};
use crate::session::SessionContext;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<Mutex<HashMap<String, Arc<DashboardSession>>>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// State one browser keeps between page loads. `api` carries its own backend
/// cookie jar, so browsers never share a backend session.
pub struct DashboardSession {
    pub api: ApiClient,
    pub identity: SessionContext,
    pub flash: Mutex<Vec<String>>,
    pub board: Mutex<InstanceBoard>,
    pub schedule: Mutex<RefreshSchedule>,
}

impl DashboardSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            identity: SessionContext::new(),
            flash: Mutex::new(Vec::new()),
            board: Mutex::new(InstanceBoard::new()),
            schedule: Mutex::new(RefreshSchedule::default()),
        }
    }

    pub fn push_flash(&self, message: impl Into<String>) {
        lock(&self.flash).push(message.into());
    }

    pub fn take_flash(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.flash))
    }

    /// Forget everything tied to the logged-in account.
    pub fn reset(&self) {
        self.identity.invalidate();
        *lock(&self.board) = InstanceBoard::new();
        *lock(&self.schedule) = RefreshSchedule::default();
    }
}

pub fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
