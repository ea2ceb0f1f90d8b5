use askama::Template;

use super::PageContext;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub identifier: String,
    pub next: String,
    pub error: Option<String>,
}
