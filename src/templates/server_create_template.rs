use askama::Template;

use crate::forms::{FormErrors, ServerInput};

use super::PageContext;

#[derive(Template)]
#[template(path = "server_create.html")]
pub struct ServerCreateTemplate {
    pub page: PageContext,
    pub form: ServerInput,
    pub errors: FormErrors,
}
