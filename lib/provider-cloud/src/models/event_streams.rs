//! Event Streams admin API bodies

use serde::{Deserialize, Serialize};

/// Topic configuration as reported by the admin API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicConfigs {
    #[serde(rename = "cleanup.policy", default, skip_serializing_if = "Option::is_none")]
    pub cleanup_policy: Option<String>,

    #[serde(rename = "min.insync.replicas", default, skip_serializing_if = "Option::is_none")]
    pub min_insync_replicas: Option<String>,

    #[serde(rename = "retention.bytes", default, skip_serializing_if = "Option::is_none")]
    pub retention_bytes: Option<String>,

    #[serde(rename = "retention.ms", default, skip_serializing_if = "Option::is_none")]
    pub retention_ms: Option<String>,

    #[serde(rename = "segment.bytes", default, skip_serializing_if = "Option::is_none")]
    pub segment_bytes: Option<String>,

    #[serde(rename = "segment.index.bytes", default, skip_serializing_if = "Option::is_none")]
    pub segment_index_bytes: Option<String>,

    #[serde(rename = "segment.ms", default, skip_serializing_if = "Option::is_none")]
    pub segment_ms: Option<String>,
}

/// A topic as returned by the admin API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub name: String,

    #[serde(default)]
    pub partitions: i64,

    #[serde(default)]
    pub replication_factor: i64,

    #[serde(default)]
    pub retention_ms: i64,

    #[serde(default)]
    pub cleanup_policy: String,

    #[serde(default)]
    pub configs: TopicConfigs,

    #[serde(default)]
    pub replica_assignments: Vec<serde_json::Value>,
}

/// Single Kafka config name/value pair
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

/// Body of a topic create request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicCreateRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_detail_from_admin_api() {
        let topic: TopicDetail = serde_json::from_value(serde_json::json!({
            "name": "orders",
            "partitions": 3,
            "replicationFactor": 3,
            "retentionMs": 86400000,
            "cleanupPolicy": "delete",
            "configs": {
                "cleanup.policy": "delete",
                "retention.ms": "86400000",
                "segment.bytes": "536870912"
            }
        }))
        .unwrap();

        assert_eq!(topic.partitions, 3);
        assert_eq!(topic.configs.retention_ms.as_deref(), Some("86400000"));
        assert_eq!(topic.configs.min_insync_replicas, None);
    }
}
