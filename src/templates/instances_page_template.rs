use askama::Template;

use crate::models::{Instance, InstanceAction};
use crate::utils::or_dash;

use super::PageContext;

/// One table row, flattened for rendering.
pub struct InstanceRow {
    pub instance_id: String,
    pub short_id: String,
    pub image_name: String,
    pub server_hostname: String,
    pub status_label: String,
    pub badge_class: &'static str,
    pub created: String,
    pub ssh_command: Option<String>,
    pub action: Option<InstanceAction>,
    pub busy: bool,
}

impl InstanceRow {
    pub fn new(inst: &Instance, busy: bool) -> Self {
        Self {
            instance_id: inst.instance_id.clone(),
            short_id: inst.short_id().to_string(),
            image_name: or_dash(inst.image_name.as_deref()),
            server_hostname: or_dash(inst.server_hostname.as_deref()),
            status_label: inst.status.badge_label(),
            badge_class: inst.status.group().css_class(),
            created: inst.created_date(),
            ssh_command: inst.ssh_command(),
            action: inst.status.available_action(),
            busy,
        }
    }

    pub fn action_path(&self, action: &InstanceAction) -> String {
        format!("/instances/{}/{}", urlencoding::encode(&self.instance_id), action.as_str())
    }
}

#[derive(Template)]
#[template(path = "instances.html")]
pub struct InstancesTemplate {
    pub page: PageContext,
    pub rows: Vec<InstanceRow>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub refresh_secs: u64,
}
