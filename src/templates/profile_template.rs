use askama::Template;

use crate::forms::FormErrors;
use crate::models::SessionUser;

use super::PageContext;

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub profile: Option<SessionUser>,
    pub load_error: Option<String>,
    pub editing: bool,
    pub key_draft: String,
    pub errors: FormErrors,
}
