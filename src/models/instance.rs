use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend-reported lifecycle label. Unknown labels are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstanceStatus {
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
    Other(String),
}

impl InstanceStatus {
    /// Exact match on the backend label; any other spelling is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "starting" => Self::Starting,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "error" => Self::Error,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Display grouping for badges. Never consulted when deciding actions.
    pub fn group(&self) -> StatusGroup {
        match self {
            Self::Running => StatusGroup::Running,
            Self::Stopped => StatusGroup::Stopped,
            Self::Error => StatusGroup::Error,
            Self::Pending | Self::Starting | Self::Stopping => StatusGroup::Pending,
            Self::Other(_) => StatusGroup::Unknown,
        }
    }

    pub fn badge_label(&self) -> String {
        match self {
            Self::Other(_) => "UNKNOWN".to_string(),
            known => known.as_str().to_uppercase(),
        }
    }

    /// The single action offered for a literal status, if any.
    pub fn available_action(&self) -> Option<InstanceAction> {
        match self {
            Self::Stopped | Self::Error => Some(InstanceAction::Start),
            Self::Running => Some(InstanceAction::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for InstanceStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Serialize for InstanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstanceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::parse(&raw))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusGroup {
    Running,
    Stopped,
    Error,
    Pending,
    Unknown,
}

impl StatusGroup {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Running => "badge-running",
            Self::Stopped => "badge-stopped",
            Self::Error => "badge-error",
            Self::Pending => "badge-pending",
            Self::Unknown => "badge-unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceAction {
    Start,
    Stop,
}

impl InstanceAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
        }
    }

    /// Status shown while the request is in flight.
    pub fn optimistic_status(&self) -> InstanceStatus {
        match self {
            Self::Start => InstanceStatus::Starting,
            Self::Stop => InstanceStatus::Stopping,
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default, deserialize_with = "crate::models::image::id_from_any")]
    pub instance_id: String,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub server_hostname: Option<String>,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ssh_host_port: Option<u16>,
}

const SHORT_ID_LEN: usize = 12;

impl Instance {
    pub fn short_id(&self) -> &str {
        match self.instance_id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.instance_id[..idx],
            None => &self.instance_id,
        }
    }

    pub fn created_date(&self) -> String {
        match self.created_at.as_deref() {
            Some(raw) => raw
                .parse::<DateTime<Utc>>()
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => "-".to_string(),
        }
    }

    /// Host and port to SSH into, offered only while the instance runs.
    pub fn ssh_target(&self) -> Option<(&str, u16)> {
        if self.status != InstanceStatus::Running {
            return None;
        }
        let host = self.server_hostname.as_deref().filter(|h| !h.is_empty())?;
        Some((host, self.ssh_host_port?))
    }

    pub fn ssh_command(&self) -> Option<String> {
        self.ssh_target().map(|(host, port)| format!("ssh -p {} {}", port, host))
    }
}

/// `POST /api/instance/create/` body. Server placement is left to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    pub image_id: String,
    pub n_gpus: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LaunchResponse {
    #[serde(default)]
    pub instance_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(status: &str) -> Instance {
        serde_json::from_value(serde_json::json!({
            "instance_id": "abc123def456789",
            "status": status,
            "server_hostname": "gpu01",
            "image_name": "pytorch:latest",
            "created_at": "2025-04-18T10:00:00Z",
            "ssh_host_port": 2222
        }))
        .unwrap()
    }

    #[test]
    fn actions_follow_literal_status() {
        assert_eq!(InstanceStatus::Running.available_action(), Some(InstanceAction::Stop));
        assert_eq!(InstanceStatus::Stopped.available_action(), Some(InstanceAction::Start));
        assert_eq!(InstanceStatus::Error.available_action(), Some(InstanceAction::Start));
        for pending in ["pending", "starting", "stopping", "rebooting"] {
            assert_eq!(InstanceStatus::parse(pending).available_action(), None, "{pending}");
        }
    }

    #[test]
    fn status_labels_match_exactly() {
        for raw in ["Running", "RUNNING", " running", "Stopped"] {
            let status = InstanceStatus::parse(raw);
            assert_eq!(status, InstanceStatus::Other(raw.to_string()));
            assert_eq!(status.available_action(), None, "{raw}");
            assert_eq!(status.badge_label(), "UNKNOWN");
        }
        assert_eq!(InstanceStatus::parse("running"), InstanceStatus::Running);
        assert_eq!(instance("Running").status.available_action(), None);
    }

    #[test]
    fn transitional_statuses_share_a_badge_group() {
        for s in ["pending", "starting", "stopping"] {
            assert_eq!(InstanceStatus::parse(s).group(), StatusGroup::Pending);
        }
        assert_eq!(InstanceStatus::Running.badge_label(), "RUNNING");
        assert_eq!(InstanceStatus::parse("weird").badge_label(), "UNKNOWN");
        assert_eq!(InstanceStatus::parse("weird").as_str(), "weird");
    }

    #[test]
    fn running_instance_advertises_ssh() {
        let inst = instance("running");
        assert_eq!(inst.short_id(), "abc123def456");
        assert_eq!(inst.created_date(), "2025-04-18");
        assert_eq!(inst.ssh_target(), Some(("gpu01", 2222)));
        assert_eq!(inst.ssh_command().as_deref(), Some("ssh -p 2222 gpu01"));
        assert_eq!(instance("stopped").ssh_target(), None);
    }

    #[test]
    fn null_status_is_unknown() {
        let inst: Instance = serde_json::from_str(r#"{"instance_id":"x","status":null}"#).unwrap();
        assert_eq!(inst.status.group(), StatusGroup::Unknown);
        assert_eq!(inst.created_date(), "-");
    }
}
