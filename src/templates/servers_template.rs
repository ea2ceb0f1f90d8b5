use askama::Template;

use crate::models::Server;

use super::PageContext;

#[derive(Template)]
#[template(path = "servers.html")]
pub struct ServersTemplate {
    pub page: PageContext,
    pub servers: Vec<Server>,
    pub error: Option<String>,
}
