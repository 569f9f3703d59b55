use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEvent {
    pub namespace: String,
    pub object_name: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_count")]
    pub count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

fn default_count() -> i32 {
    1
}

impl ClusterEvent {
    pub fn is_warning(&self) -> bool {
        self.r#type == "Warning"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated_reason: Option<String>,
}

/// Controller pod state reduced to what health reporting needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSummary {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
    #[serde(default)]
    pub init_containers: Vec<ContainerSummary>,
}

impl PodSummary {
    pub fn is_healthy(&self) -> bool {
        match self.phase.as_str() {
            "Succeeded" => true,
            "Running" => self
                .containers
                .iter()
                .all(|container| container.ready && container.waiting_reason.is_none()),
            _ => false,
        }
    }

    /// Most specific reason available: container waiting or terminated
    /// reason, then init container reasons, then the phase.
    pub fn phase_reason(&self) -> String {
        for container in &self.containers {
            if let Some(reason) = non_empty(&container.waiting_reason) {
                return reason.to_string();
            }
            if let Some(reason) = non_empty(&container.terminated_reason) {
                return reason.to_string();
            }
        }
        for container in &self.init_containers {
            if let Some(reason) = non_empty(&container.waiting_reason) {
                return format!("Init:{reason}");
            }
        }
        if self.phase.is_empty() {
            "Unknown".to_string()
        } else {
            self.phase.clone()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|reason| !reason.is_empty())
}
