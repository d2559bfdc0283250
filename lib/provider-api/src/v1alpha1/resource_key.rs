use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::{impl_managed, Condition, DeletionPolicy, Reference, SecretReference, Selector};

/// ResourceKey - credentials issued for a resource instance
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "resourcecontroller.cloud.datum.net",
    version = "v1alpha1",
    kind = "ResourceKey",
    plural = "resourcekeys",
    derive = "Default",
    status = "ResourceKeyStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeySpec {
    /// Desired state of the key
    pub for_provider: ResourceKeyParameters,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    /// Secret receiving the issued credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,

    /// Templates rendered against the credentials, one per secret key.
    /// When unset the credentials are flattened into dotted keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_templates: Option<BTreeMap<String, String>>,
}

/// Desired state of a resource key
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeyParameters {
    /// Name of the key
    pub name: String,

    /// CRN or id of the instance the key is issued for. Immutable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Reference to a ResourceInstance whose external name fills `source`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<Reference>,

    /// Selects a ResourceInstance whose external name fills `source`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_selector: Option<Selector>,

    /// Role name or CRN granted to the credentials. Immutable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Extra creation parameters. Immutable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResourceKeyCreateParameters>,
}

/// Extra creation parameters for a resource key
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeyCreateParameters {
    /// Service id to bind the credentials to instead of creating one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id_crn: Option<String>,
}

/// Observed state of a resource key
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeyObservation {
    pub id: String,

    pub guid: String,

    pub crn: String,

    pub url: String,

    pub account_id: String,

    pub resource_group_id: String,

    pub source_crn: String,

    pub state: String,

    pub iam_compatible: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Kafka admin endpoint carried by Event Streams credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_admin_url: Option<String>,
}

/// Status of a resource key
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeyStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<ResourceKeyObservation>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(ResourceKey);
