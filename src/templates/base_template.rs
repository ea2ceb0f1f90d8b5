use crate::models::SessionUser;

/// Layout values shared by every page. Flash messages are consumed when the
/// context is built.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    pub current_user: Option<SessionUser>,
    pub api_hostname: String,
    pub flash_messages: Vec<String>,
}

impl PageContext {
    pub fn is_staff(&self) -> bool {
        self.current_user.as_ref().map(|u| u.is_staff).unwrap_or(false)
    }

    pub fn has_flash_messages(&self) -> bool {
        !self.flash_messages.is_empty()
    }
}
