use askama::Template;

use crate::forms::{FormErrors, SignupInput};

use super::PageContext;

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub form: SignupInput,
    pub errors: FormErrors,
}
