use askama::Template;

use crate::forms::{FormErrors, ImageInput};

use super::PageContext;

#[derive(Template)]
#[template(path = "image_create.html")]
pub struct ImageCreateTemplate {
    pub page: PageContext,
    pub form: ImageInput,
    pub errors: FormErrors,
}
