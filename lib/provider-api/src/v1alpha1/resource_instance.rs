use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{impl_managed, preserve_unknown_fields, Condition, DeletionPolicy, SecretReference};

/// ResourceInstance - a provisioned instance of a catalog service
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "resourcecontroller.cloud.datum.net",
    version = "v1alpha1",
    kind = "ResourceInstance",
    plural = "resourceinstances",
    derive = "Default",
    status = "ResourceInstanceStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.atProvider.state"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstanceSpec {
    /// Desired state of the instance
    pub for_provider: ResourceInstanceParameters,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

/// Desired state of a resource instance
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstanceParameters {
    /// Name of the instance
    pub name: String,

    /// Deployment location, e.g. "us-south" or "global". Immutable.
    pub target: String,

    /// Resource group the instance is created in. Immutable.
    #[serde(default)]
    pub resource_group_name: String,

    /// Catalog service name, e.g. "messagehub". Immutable.
    pub service_name: String,

    /// Catalog plan name, e.g. "standard"
    #[serde(default)]
    pub resource_plan_name: String,

    /// Tags attached to the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Whether the instance may be deleted while it still has keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_cleanup: Option<bool>,

    /// Service-specific configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub parameters: Option<serde_json::Value>,

    /// Lock the instance against changes. Only applied at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_lock: Option<bool>,
}

/// Observed state of a resource instance
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstanceObservation {
    pub id: String,

    pub guid: String,

    pub crn: String,

    pub url: String,

    pub account_id: String,

    pub resource_group_id: String,

    pub resource_plan_id: String,

    pub target_crn: String,

    /// Lifecycle state reported by the cloud
    pub state: String,

    pub locked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<String>,
}

/// Status of a resource instance
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstanceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<ResourceInstanceObservation>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(ResourceInstance);
