//! Resource controller API bodies

use serde::{Deserialize, Serialize};

/// Lifecycle state of a resource instance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceInstanceState {
    Active,
    Inactive,
    Failed,
    PendingReclamation,
    Provisioning,
    PreProvisioning,
    Removed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceInstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceInstanceState::Active => "active",
            ResourceInstanceState::Inactive => "inactive",
            ResourceInstanceState::Failed => "failed",
            ResourceInstanceState::PendingReclamation => "pending_reclamation",
            ResourceInstanceState::Provisioning => "provisioning",
            ResourceInstanceState::PreProvisioning => "pre_provisioning",
            ResourceInstanceState::Removed => "removed",
            ResourceInstanceState::Unknown => "unknown",
        }
    }
}

/// Lifecycle state of a resource key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKeyState {
    Active,
    Inactive,
    Removed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceKeyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKeyState::Active => "active",
            ResourceKeyState::Inactive => "inactive",
            ResourceKeyState::Removed => "removed",
            ResourceKeyState::Unknown => "unknown",
        }
    }
}

/// Last asynchronous operation on an instance
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(default, rename = "type")]
    pub operation_type: String,

    #[serde(default)]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resource instance as returned by the API.
///
/// `tags` comes from the tagging API and is merged in by the client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    pub id: String,

    #[serde(default)]
    pub guid: String,

    #[serde(default)]
    pub crn: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub resource_group_id: String,

    #[serde(default)]
    pub resource_id: String,

    #[serde(default)]
    pub resource_plan_id: String,

    #[serde(default)]
    pub target_crn: String,

    /// Deployment location, e.g. `us-south`
    #[serde(default)]
    pub region_id: String,

    #[serde(default)]
    pub state: ResourceInstanceState,

    #[serde(default)]
    pub allow_cleanup: bool,

    #[serde(default)]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of a resource instance create request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResourceInstanceRequest {
    pub name: String,

    pub target: String,

    pub resource_group: String,

    pub resource_plan_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_cleanup: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_lock: Option<bool>,
}

/// A resource key as returned by the API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceKey {
    pub id: String,

    #[serde(default)]
    pub guid: String,

    #[serde(default)]
    pub crn: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub resource_group_id: String,

    #[serde(default)]
    pub source_crn: String,

    #[serde(default)]
    pub state: ResourceKeyState,

    #[serde(default)]
    pub iam_compatible: bool,

    #[serde(default)]
    pub resource_instance_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Issued credentials, shape depends on the service
    #[serde(default)]
    pub credentials: serde_json::Value,
}

/// Body of a resource key create request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResourceKeyRequest {
    pub name: String,

    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}
