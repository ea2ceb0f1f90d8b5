use askama::Template;

use super::PageContext;

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
    pub path: String,
}
