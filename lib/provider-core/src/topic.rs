//! Event Streams topic reconciliation
//!
//! A topic is addressed by its name within the instance behind the admin
//! URL. The name is the external name and defaults to the object name.

use async_trait::async_trait;
use kube::ResourceExt;
use provider_api::common::{external_name, set_external_name, Condition, Managed};
use provider_api::v1alpha1::topic::{TopicConfigs, TopicObservation};
use provider_api::v1alpha1::{ResourceKey, Topic, TopicParameters};
use provider_cloud::models::{
    ConfigEntry, PatchDocument, TopicConfigs as CloudConfigs, TopicCreateRequest, TopicDetail,
};
use provider_cloud::EventStreamsAdminApi;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::fields::late_init;
use crate::reference::{extract_kafka_admin_url, resolve, ReferenceSource, ResolutionRequest};
use crate::{
    CoreError, ExternalClient, ExternalCreation, ExternalObservation, ReferenceResolution, Result,
};

/// Fields of a topic that can change after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicField {
    Partitions,
    /// A Kafka config, by its Kafka name
    Config(&'static str),
}

fn config_entries(configs: &TopicConfigs) -> [(&'static str, Option<&String>); 7] {
    [
        ("cleanup.policy", configs.cleanup_policy.as_ref()),
        ("min.insync.replicas", configs.min_insync_replicas.as_ref()),
        ("retention.bytes", configs.retention_bytes.as_ref()),
        ("retention.ms", configs.retention_ms.as_ref()),
        ("segment.bytes", configs.segment_bytes.as_ref()),
        ("segment.index.bytes", configs.segment_index_bytes.as_ref()),
        ("segment.ms", configs.segment_ms.as_ref()),
    ]
}

fn config_slots(configs: &mut TopicConfigs) -> [(&'static str, &mut Option<String>); 7] {
    [
        ("cleanup.policy", &mut configs.cleanup_policy),
        ("min.insync.replicas", &mut configs.min_insync_replicas),
        ("retention.bytes", &mut configs.retention_bytes),
        ("retention.ms", &mut configs.retention_ms),
        ("segment.bytes", &mut configs.segment_bytes),
        ("segment.index.bytes", &mut configs.segment_index_bytes),
        ("segment.ms", &mut configs.segment_ms),
    ]
}

fn configs_from_cloud(configs: &CloudConfigs) -> TopicConfigs {
    TopicConfigs {
        cleanup_policy: configs.cleanup_policy.clone(),
        min_insync_replicas: configs.min_insync_replicas.clone(),
        retention_bytes: configs.retention_bytes.clone(),
        retention_ms: configs.retention_ms.clone(),
        segment_bytes: configs.segment_bytes.clone(),
        segment_index_bytes: configs.segment_index_bytes.clone(),
        segment_ms: configs.segment_ms.clone(),
    }
}

/// Name of the topic managed by a resource
pub fn topic_name(resource: &Topic) -> String {
    external_name(resource)
        .map(str::to_string)
        .unwrap_or_else(|| resource.name_any())
}

/// Create request for the desired state
pub fn generate_request(name: &str, params: &TopicParameters) -> TopicCreateRequest {
    let configs = params
        .configs
        .as_ref()
        .map(|configs| {
            config_entries(configs)
                .into_iter()
                .filter_map(|(name, value)| {
                    value.map(|value| ConfigEntry {
                        name: name.to_string(),
                        value: value.clone(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    TopicCreateRequest {
        name: name.to_string(),
        partitions: params.partitions,
        configs,
    }
}

pub fn generate_observation(topic: &TopicDetail) -> TopicObservation {
    TopicObservation {
        name: topic.name.clone(),
        partitions: topic.partitions,
        replication_factor: topic.replication_factor,
        retention_ms: topic.retention_ms,
        cleanup_policy: topic.cleanup_policy.clone(),
    }
}

/// Desired state that would produce the observed topic
pub fn generate_parameters(topic: &TopicDetail, kafka_admin_url: Option<String>) -> TopicParameters {
    TopicParameters {
        kafka_admin_url,
        kafka_admin_url_ref: None,
        kafka_admin_url_selector: None,
        partitions: (topic.partitions > 0).then_some(topic.partitions),
        configs: Some(configs_from_cloud(&topic.configs)),
    }
}

/// Fill unset desired fields from the observed topic
pub fn late_initialize(params: &mut TopicParameters, topic: &TopicDetail) -> bool {
    let mut changed = late_init(
        &mut params.partitions,
        (topic.partitions > 0).then_some(topic.partitions),
    );

    let observed = configs_from_cloud(&topic.configs);
    if let Some(configs) = params.configs.as_mut() {
        let values = config_entries(&observed).map(|(_, value)| value.cloned());
        for ((_, slot), value) in config_slots(configs).into_iter().zip(values) {
            changed |= late_init(slot, value);
        }
    } else if observed != TopicConfigs::default() {
        params.configs = Some(observed);
        changed = true;
    }

    changed
}

/// Mutable fields where desired and observed disagree
pub fn changed_fields(desired: &TopicParameters, topic: &TopicDetail) -> Vec<TopicField> {
    let actual = generate_parameters(topic, None);
    let mut fields = Vec::new();

    if desired.partitions.is_some() && desired.partitions != actual.partitions {
        fields.push(TopicField::Partitions);
    }

    if let (Some(desired), Some(actual)) = (&desired.configs, &actual.configs) {
        for ((name, want), (_, have)) in config_entries(desired)
            .into_iter()
            .zip(config_entries(actual))
        {
            if want.is_some() && want != have {
                fields.push(TopicField::Config(name));
            }
        }
    }
    fields
}

pub fn is_up_to_date(name: &str, desired: &TopicParameters, topic: &TopicDetail) -> bool {
    topic.name == name && changed_fields(desired, topic).is_empty()
}

/// Sparse update: a new partition total and the configs that differ.
///
/// Partition counts can only grow; a smaller count is passed through and
/// rejected by the admin API.
pub fn build_patch(desired: &TopicParameters, topic: &TopicDetail) -> PatchDocument {
    let mut patch = PatchDocument::new();
    let mut configs = Vec::new();

    for field in changed_fields(desired, topic) {
        match field {
            TopicField::Partitions => {
                if let Some(partitions) = desired.partitions {
                    patch.insert("new_total_partition_count".to_string(), json!(partitions));
                }
            }
            TopicField::Config(name) => {
                let value = desired.configs.as_ref().and_then(|configs| {
                    config_entries(configs)
                        .into_iter()
                        .find(|(entry, _)| *entry == name)
                        .and_then(|(_, value)| value.cloned())
                });
                if let Some(value) = value {
                    configs.push(json!({ "name": name, "value": value }));
                }
            }
        }
    }

    if !configs.is_empty() {
        patch.insert("configs".to_string(), Value::Array(configs));
    }
    patch
}

/// Manages topics through the Event Streams admin API
pub struct TopicClient {
    api: Arc<dyn EventStreamsAdminApi>,
    keys: Arc<dyn ReferenceSource<ResourceKey>>,
}

impl TopicClient {
    pub fn new(api: Arc<dyn EventStreamsAdminApi>, keys: Arc<dyn ReferenceSource<ResourceKey>>) -> Self {
        Self { api, keys }
    }

    fn admin_url(resource: &Topic) -> Result<String> {
        resource
            .spec
            .for_provider
            .kafka_admin_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                CoreError::InvalidConfiguration(
                    "topic has no kafkaAdminUrl; set it directly or through a reference".to_string(),
                )
            })
    }
}

#[async_trait]
impl ExternalClient<Topic> for TopicClient {
    async fn resolve_references(&self, resource: &mut Topic) -> Result<ReferenceResolution> {
        let params = &mut resource.spec.for_provider;
        let current = params.kafka_admin_url.clone().unwrap_or_default();

        let response = resolve(
            self.keys.as_ref(),
            ResolutionRequest {
                field: "kafkaAdminUrl",
                current_value: &current,
                reference: params.kafka_admin_url_ref.as_ref(),
                selector: params.kafka_admin_url_selector.as_ref(),
                extract: extract_kafka_admin_url,
            },
        )
        .await?;

        let mut resolution = ReferenceResolution::default();
        if response.is_pending() {
            resolution.pending.push("kafkaAdminUrl");
            return Ok(resolution);
        }

        if response.resolved_value != current {
            debug!("Resolved topic admin URL to {}", response.resolved_value);
            params.kafka_admin_url = Some(response.resolved_value);
            resolution.changed = true;
        }
        if response.resolved_reference != params.kafka_admin_url_ref {
            params.kafka_admin_url_ref = response.resolved_reference;
            resolution.changed = true;
        }
        Ok(resolution)
    }

    async fn observe(&self, resource: &mut Topic) -> Result<ExternalObservation> {
        // A topic deleted before its admin URL resolved has no remote object
        if resource.metadata.deletion_timestamp.is_some() && Self::admin_url(resource).is_err() {
            info!("Topic {} has no kafkaAdminUrl, releasing it", resource.name_any());
            return Ok(ExternalObservation::absent());
        }
        let admin_url = Self::admin_url(resource)?;
        let name = topic_name(resource);

        let topic = match self.api.get_topic(&admin_url, &name).await {
            Ok(topic) => topic,
            Err(e) if e.is_not_found() => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(CoreError::cloud("cannot get topic")(e)),
        };

        let late_initialized = late_initialize(&mut resource.spec.for_provider, &topic);

        resource.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&topic));
        resource.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&name, &resource.spec.for_provider, &topic),
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&self, resource: &mut Topic) -> Result<ExternalCreation> {
        let admin_url = Self::admin_url(resource)?;
        let name = topic_name(resource);
        let request = generate_request(&name, &resource.spec.for_provider);

        self.api
            .create_topic(&admin_url, &request)
            .await
            .map_err(CoreError::cloud("cannot create topic"))?;

        info!("Created topic {}", name);
        set_external_name(resource, name);
        resource.set_condition(Condition::creating());
        Ok(ExternalCreation::default())
    }

    async fn update(&self, resource: &mut Topic) -> Result<()> {
        let admin_url = Self::admin_url(resource)?;
        let name = topic_name(resource);

        let topic = self
            .api
            .get_topic(&admin_url, &name)
            .await
            .map_err(CoreError::cloud("cannot get topic"))?;

        let patch = build_patch(&resource.spec.for_provider, &topic);
        if patch.is_empty() {
            return Ok(());
        }

        debug!("Updating topic {} with {:?}", name, patch);
        self.api
            .update_topic(&admin_url, &name, &patch)
            .await
            .map_err(CoreError::cloud("cannot update topic"))?;
        Ok(())
    }

    async fn delete(&self, resource: &mut Topic) -> Result<()> {
        resource.set_condition(Condition::deleting());
        let admin_url = Self::admin_url(resource)?;
        let name = topic_name(resource);

        match self.api.delete_topic(&admin_url, &name).await {
            Ok(()) => {
                info!("Deleted topic {}", name);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::cloud("cannot delete topic")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_api::common::{ConditionReason, Reference};
    use provider_api::v1alpha1::resource_key::{ResourceKeyObservation, ResourceKeySpec, ResourceKeyStatus};
    use provider_api::v1alpha1::topic::TopicSpec;
    use provider_cloud::{CloudError, MockEventStreamsAdminApi};

    const ADMIN_URL: &str = "https://admin.eventstreams.example";

    struct Keys(Vec<ResourceKey>);

    #[async_trait]
    impl ReferenceSource<ResourceKey> for Keys {
        async fn get(&self, name: &str) -> Result<ResourceKey> {
            self.0
                .iter()
                .find(|key| key.name_any() == name)
                .cloned()
                .ok_or_else(|| CoreError::NotFound(name.to_string()))
        }

        async fn list(&self) -> Result<Vec<ResourceKey>> {
            Ok(self.0.clone())
        }
    }

    fn key(name: &str, admin_url: Option<&str>) -> ResourceKey {
        let mut key = ResourceKey::new(name, ResourceKeySpec::default());
        key.status = Some(ResourceKeyStatus {
            at_provider: Some(ResourceKeyObservation {
                kafka_admin_url: admin_url.map(str::to_string),
                ..Default::default()
            }),
            conditions: vec![],
        });
        key
    }

    fn observed() -> TopicDetail {
        TopicDetail {
            name: "orders".to_string(),
            partitions: 3,
            replication_factor: 3,
            retention_ms: 86_400_000,
            cleanup_policy: "delete".to_string(),
            configs: CloudConfigs {
                cleanup_policy: Some("delete".to_string()),
                retention_ms: Some("86400000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn desired() -> TopicParameters {
        TopicParameters {
            kafka_admin_url: Some(ADMIN_URL.to_string()),
            ..Default::default()
        }
    }

    fn managed(params: TopicParameters) -> Topic {
        Topic::new(
            "orders",
            TopicSpec {
                for_provider: params,
                ..Default::default()
            },
        )
    }

    fn client(api: MockEventStreamsAdminApi, keys: Vec<ResourceKey>) -> TopicClient {
        TopicClient::new(Arc::new(api), Arc::new(Keys(keys)))
    }

    #[test]
    fn test_late_initialize_partitions_and_configs() {
        let mut params = desired();

        assert!(late_initialize(&mut params, &observed()));
        assert_eq!(params.partitions, Some(3));
        let configs = params.configs.as_ref().unwrap();
        assert_eq!(configs.cleanup_policy.as_deref(), Some("delete"));
        assert_eq!(configs.retention_ms.as_deref(), Some("86400000"));
        assert_eq!(configs.segment_ms, None);

        assert!(!late_initialize(&mut params, &observed()));
    }

    #[test]
    fn test_late_initialize_fills_individual_configs() {
        let mut params = desired();
        params.configs = Some(TopicConfigs {
            retention_ms: Some("3600000".to_string()),
            ..Default::default()
        });

        assert!(late_initialize(&mut params, &observed()));

        let configs = params.configs.unwrap();
        assert_eq!(configs.retention_ms.as_deref(), Some("3600000"));
        assert_eq!(configs.cleanup_policy.as_deref(), Some("delete"));
    }

    #[test]
    fn test_up_to_date_after_late_init() {
        let mut params = desired();
        late_initialize(&mut params, &observed());

        assert!(is_up_to_date("orders", &params, &observed()));
        assert!(!is_up_to_date("payments", &params, &observed()));
    }

    #[test]
    fn test_patch_grows_partitions_and_changes_configs() {
        let mut params = desired();
        params.partitions = Some(6);
        params.configs = Some(TopicConfigs {
            retention_ms: Some("3600000".to_string()),
            segment_bytes: Some("1073741824".to_string()),
            ..Default::default()
        });

        let patch = build_patch(&params, &observed());

        assert_eq!(
            Value::Object(patch),
            json!({
                "new_total_partition_count": 6,
                "configs": [
                    {"name": "retention.ms", "value": "3600000"},
                    {"name": "segment.bytes", "value": "1073741824"}
                ]
            })
        );
    }

    #[test]
    fn test_partition_shrink_is_passed_through() {
        let mut params = desired();
        params.partitions = Some(1);

        assert_eq!(changed_fields(&params, &observed()), vec![TopicField::Partitions]);
        assert_eq!(
            build_patch(&params, &observed()).get("new_total_partition_count"),
            Some(&json!(1))
        );
    }

    #[test]
    fn test_create_request_lists_set_configs() {
        let mut params = desired();
        params.partitions = Some(3);
        params.configs = Some(TopicConfigs {
            cleanup_policy: Some("compact".to_string()),
            ..Default::default()
        });

        let request = generate_request("orders", &params);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "orders",
                "partitions": 3,
                "configs": [{"name": "cleanup.policy", "value": "compact"}]
            })
        );
    }

    #[test]
    fn test_topic_name_defaults_to_object_name() {
        let mut topic = managed(desired());
        assert_eq!(topic_name(&topic), "orders");

        set_external_name(&mut topic, "orders-v2");
        assert_eq!(topic_name(&topic), "orders-v2");
    }

    #[tokio::test]
    async fn test_resolve_admin_url_from_key() {
        let client = client(MockEventStreamsAdminApi::new(), vec![key("events-key", Some(ADMIN_URL))]);
        let mut topic = managed(TopicParameters {
            kafka_admin_url_ref: Some(Reference::new("events-key")),
            ..Default::default()
        });

        let resolution = client.resolve_references(&mut topic).await.unwrap();

        assert!(resolution.changed);
        assert_eq!(topic.spec.for_provider.kafka_admin_url.as_deref(), Some(ADMIN_URL));
    }

    #[tokio::test]
    async fn test_resolve_admin_url_pending() {
        let client = client(MockEventStreamsAdminApi::new(), vec![key("events-key", None)]);
        let mut topic = managed(TopicParameters {
            kafka_admin_url_ref: Some(Reference::new("events-key")),
            ..Default::default()
        });

        let resolution = client.resolve_references(&mut topic).await.unwrap();

        assert_eq!(resolution.pending, vec!["kafkaAdminUrl"]);
    }

    #[tokio::test]
    async fn test_observe_missing_topic() {
        let mut api = MockEventStreamsAdminApi::new();
        api.expect_get_topic().returning(|url, name| {
            assert_eq!(url, ADMIN_URL);
            Err(CloudError::NotFound(name.to_string()))
        });
        let client = client(api, vec![]);
        let mut topic = managed(desired());

        let observation = client.observe(&mut topic).await.unwrap();

        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn test_observe_existing_topic() {
        let mut api = MockEventStreamsAdminApi::new();
        api.expect_get_topic().returning(|_, _| Ok(observed()));
        let client = client(api, vec![]);
        let mut topic = managed(desired());

        let observation = client.observe(&mut topic).await.unwrap();

        assert!(observation.resource_exists);
        assert!(observation.resource_up_to_date);
        assert!(observation.resource_late_initialized);
        let status = topic.status.unwrap();
        assert_eq!(status.conditions[0].reason, ConditionReason::Available);
        assert_eq!(status.at_provider.unwrap().replication_factor, 3);
    }

    #[tokio::test]
    async fn test_observe_without_admin_url_fails() {
        let client = client(MockEventStreamsAdminApi::new(), vec![]);
        let mut topic = managed(TopicParameters::default());

        let err = client.observe(&mut topic).await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_deleted_topic_without_admin_url_is_absent() {
        let client = client(MockEventStreamsAdminApi::new(), vec![]);
        let mut topic = managed(TopicParameters::default());
        topic.metadata = serde_json::from_value(json!({
            "name": "orders",
            "deletionTimestamp": "2026-10-01T12:00:00Z",
            "finalizers": ["finalizer.managedresource.cloud.datum.net"]
        }))
        .unwrap();

        let observation = client.observe(&mut topic).await.unwrap();

        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn test_create_sets_external_name() {
        let mut api = MockEventStreamsAdminApi::new();
        api.expect_create_topic().times(1).returning(|_, request| {
            assert_eq!(request.name, "orders");
            Ok(())
        });
        let client = client(api, vec![]);
        let mut topic = managed(desired());

        client.create(&mut topic).await.unwrap();

        assert_eq!(external_name(&topic), Some("orders"));
    }

    #[tokio::test]
    async fn test_update_surfaces_rejected_shrink() {
        let mut api = MockEventStreamsAdminApi::new();
        api.expect_get_topic().returning(|_, _| Ok(observed()));
        api.expect_update_topic().returning(|_, _, _| {
            Err(CloudError::Api {
                status: 422,
                message: "partitions can only be increased".to_string(),
            })
        });
        let client = client(api, vec![]);
        let mut params = desired();
        params.partitions = Some(1);
        let mut topic = managed(params);

        let err = client.update(&mut topic).await.unwrap_err();

        assert!(matches!(err, CoreError::Cloud { .. }));
    }
}
