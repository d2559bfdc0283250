use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{impl_managed, Condition, DeletionPolicy, Identity, SecretReference};

/// VPC - a virtual private cloud network in one region
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vpc.cloud.datum.net",
    version = "v1alpha1",
    kind = "VPC",
    plural = "vpcs",
    derive = "Default",
    status = "VPCStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"External-Name","type":"string","jsonPath":".metadata.annotations.cloud\\.datum\\.net/external-name"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct VPCSpec {
    /// Desired state of the VPC
    pub for_provider: VPCParameters,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

/// Desired state of a VPC
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCParameters {
    /// Unique user-defined name (generated by the cloud if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether a default address prefix is created per zone.
    /// Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix_management: Option<AddressPrefixManagement>,

    /// Whether the VPC is connected to classic infrastructure.
    /// Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classic_access: Option<bool>,

    /// Resource group owning the VPC. Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<Identity>,
}

/// Address prefix management mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AddressPrefixManagement {
    Auto,
    Manual,
}

impl AddressPrefixManagement {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressPrefixManagement::Auto => "auto",
            AddressPrefixManagement::Manual => "manual",
        }
    }
}

/// Observed state of a VPC
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCObservation {
    pub id: String,

    pub crn: String,

    pub href: String,

    /// Lifecycle status reported by the cloud
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    pub classic_access: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_network_acl: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_routing_table: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_security_group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

/// Status of a VPC
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<VPCObservation>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(VPC);
