use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{impl_managed, Condition, DeletionPolicy, Reference, SecretReference, Selector};

/// Topic - a Kafka topic in an Event Streams instance.
///
/// The topic name is the external name of the resource and defaults to the
/// object name.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "eventstreams.cloud.datum.net",
    version = "v1alpha1",
    kind = "Topic",
    plural = "topics",
    derive = "Default",
    status = "TopicStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Partitions","type":"integer","jsonPath":".status.atProvider.partitions"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct TopicSpec {
    /// Desired state of the topic
    pub for_provider: TopicParameters,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

/// Desired state of a topic
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicParameters {
    /// Admin REST endpoint of the Event Streams instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_admin_url: Option<String>,

    /// Reference to a ResourceKey whose credentials carry the admin endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_admin_url_ref: Option<Reference>,

    /// Selects a ResourceKey whose credentials carry the admin endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka_admin_url_selector: Option<Selector>,

    /// Number of partitions. Can only grow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<i64>,

    /// Topic configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configs: Option<TopicConfigs>,
}

/// Kafka topic configuration, values as the admin API reports them
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicConfigs {
    /// "delete", "compact" or "compact,delete"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_insync_replicas: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_bytes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_ms: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_bytes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_index_bytes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_ms: Option<String>,
}

/// Observed state of a topic
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicObservation {
    pub name: String,

    pub partitions: i64,

    pub replication_factor: i64,

    pub retention_ms: i64,

    pub cleanup_policy: String,
}

/// Status of a topic
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<TopicObservation>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Topic);
