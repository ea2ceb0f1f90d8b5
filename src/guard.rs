use crate::models::SessionUser;

pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin access required.";

/// Outcome of checking a route's access requirements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { next: String },
    RedirectHome { message: &'static str },
}

impl GuardDecision {
    /// Location header value for a redirecting decision.
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { next } => Some(login_redirect(next)),
            Self::RedirectHome { .. } => Some("/".to_string()),
        }
    }
}

pub fn require_authenticated(user: Option<&SessionUser>, requested: &str) -> GuardDecision {
    match user {
        Some(u) if u.is_authenticated => GuardDecision::Allow,
        _ => GuardDecision::RedirectToLogin {
            next: requested.to_string(),
        },
    }
}

/// Authentication first, then the staff flag.
pub fn require_staff(user: Option<&SessionUser>, requested: &str) -> GuardDecision {
    match require_authenticated(user, requested) {
        GuardDecision::Allow => {}
        other => return other,
    }
    if user.map(|u| u.is_staff).unwrap_or(false) {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectHome {
            message: ADMIN_REQUIRED_MESSAGE,
        }
    }
}

pub fn login_redirect(next: &str) -> String {
    match safe_next(Some(next)) {
        Some(path) if path != "/" => format!("/login?next={}", urlencoding::encode(path)),
        _ => "/login".to_string(),
    }
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        Some(next)
    } else {
        None
    }
}
