//! Resource instance reconciliation
//!
//! The instance API speaks in ids while the desired state uses plan and
//! resource group names, so mapping in either direction goes through the
//! catalog. Tags live in a separate API and converge by attach/detach.

use async_trait::async_trait;
use provider_api::common::{external_name, set_external_name, Condition, Managed};
use provider_api::v1alpha1::resource_instance::ResourceInstanceObservation;
use provider_api::v1alpha1::{ResourceInstance, ResourceInstanceParameters};
use provider_cloud::models::{
    CreateResourceInstanceRequest, PatchDocument, ResourceInstance as CloudInstance,
    ResourceInstanceState,
};
use provider_cloud::{CatalogApi, ResourceControllerApi};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::fields::{late_init, late_init_required, unset_or_equal};
use crate::{CoreError, ExternalClient, ExternalCreation, ExternalObservation, Result};

/// Fields of an instance that can change after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceInstanceField {
    Name,
    Plan,
    Parameters,
    AllowCleanup,
    Tags,
}

async fn plan_name(catalog: &dyn CatalogApi, service_name: &str, plan_id: &str) -> Result<String> {
    if plan_id.is_empty() || service_name.is_empty() {
        return Ok(String::new());
    }
    catalog
        .resource_plan_name(service_name, plan_id)
        .await
        .map_err(CoreError::lookup("cannot look up resource plan name"))
}

async fn resource_group_name(catalog: &dyn CatalogApi, group_id: &str) -> Result<String> {
    if group_id.is_empty() {
        return Ok(String::new());
    }
    catalog
        .resource_group_name(group_id)
        .await
        .map_err(CoreError::lookup("cannot look up resource group name"))
}

fn tag_set(tags: &[String]) -> BTreeSet<&str> {
    tags.iter().map(String::as_str).filter(|tag| !tag.is_empty()).collect()
}

/// True when every field of `desired` appears in `actual` with the same value
fn parameters_contained(desired: &Value, actual: Option<&Value>) -> bool {
    match (desired, actual) {
        (Value::Object(desired), Some(Value::Object(actual))) => desired
            .iter()
            .all(|(key, value)| actual.get(key) == Some(value)),
        (Value::Object(desired), None) => desired.is_empty(),
        (desired, actual) => Some(desired) == actual,
    }
}

pub fn generate_observation(instance: &CloudInstance) -> ResourceInstanceObservation {
    ResourceInstanceObservation {
        id: instance.id.clone(),
        guid: instance.guid.clone(),
        crn: instance.crn.clone(),
        url: instance.url.clone(),
        account_id: instance.account_id.clone(),
        resource_group_id: instance.resource_group_id.clone(),
        resource_plan_id: instance.resource_plan_id.clone(),
        target_crn: instance.target_crn.clone(),
        state: instance.state.as_str().to_string(),
        locked: instance.locked,
        dashboard_url: instance.dashboard_url.clone(),
        created_at: instance.created_at.clone(),
        last_operation: instance
            .last_operation
            .as_ref()
            .map(|op| format!("{} {}", op.operation_type, op.state)),
    }
}

/// Desired state that would produce the observed instance.
///
/// The service name is not reported by the instance API and is taken
/// from the desired state. The resource group name is left empty; it is
/// only looked up by [`late_initialize`].
pub async fn generate_parameters(
    instance: &CloudInstance,
    service_name: &str,
    catalog: &dyn CatalogApi,
) -> Result<ResourceInstanceParameters> {
    let resource_plan_name = plan_name(catalog, service_name, &instance.resource_plan_id).await?;

    let mut tags = instance.tags.clone();
    tags.sort();

    Ok(ResourceInstanceParameters {
        name: instance.name.clone(),
        target: instance.region_id.clone(),
        resource_group_name: String::new(),
        service_name: service_name.to_string(),
        resource_plan_name,
        tags: Some(tags),
        allow_cleanup: Some(instance.allow_cleanup),
        parameters: instance.parameters.clone(),
        entity_lock: Some(instance.locked),
    })
}

/// Fill unset desired fields from the observed instance
pub async fn late_initialize(
    params: &mut ResourceInstanceParameters,
    instance: &CloudInstance,
    catalog: &dyn CatalogApi,
) -> Result<bool> {
    let mut changed = late_init_required(&mut params.target, &instance.region_id);

    if params.resource_group_name.is_empty() {
        let name = resource_group_name(catalog, &instance.resource_group_id).await?;
        changed |= late_init_required(&mut params.resource_group_name, &name);
    }
    if params.resource_plan_name.is_empty() {
        let name = plan_name(catalog, &params.service_name, &instance.resource_plan_id).await?;
        changed |= late_init_required(&mut params.resource_plan_name, &name);
    }

    let observed_tags = (!instance.tags.is_empty()).then(|| instance.tags.clone());
    changed |= late_init(&mut params.tags, observed_tags);
    changed |= late_init(&mut params.allow_cleanup, Some(instance.allow_cleanup));
    changed |= late_init(&mut params.entity_lock, Some(instance.locked));

    let observed_parameters = instance
        .parameters
        .clone()
        .filter(|p| !p.is_null() && p.as_object().map_or(true, |fields| !fields.is_empty()));
    changed |= late_init(&mut params.parameters, observed_parameters);

    Ok(changed)
}

/// Mutable fields where desired and observed disagree.
///
/// Target, resource group, service and entity lock are fixed at creation
/// and never compared.
pub async fn changed_fields(
    desired: &ResourceInstanceParameters,
    instance: &CloudInstance,
    catalog: &dyn CatalogApi,
) -> Result<Vec<ResourceInstanceField>> {
    let actual = generate_parameters(instance, &desired.service_name, catalog).await?;
    let mut fields = Vec::new();

    if !unset_or_equal(Some(desired.name.as_str()), Some(actual.name.as_str())) {
        fields.push(ResourceInstanceField::Name);
    }
    if !unset_or_equal(
        Some(desired.resource_plan_name.as_str()),
        Some(actual.resource_plan_name.as_str()),
    ) {
        fields.push(ResourceInstanceField::Plan);
    }
    if let Some(parameters) = &desired.parameters {
        if !parameters_contained(parameters, actual.parameters.as_ref()) {
            fields.push(ResourceInstanceField::Parameters);
        }
    }
    if desired.allow_cleanup.is_some() && desired.allow_cleanup != actual.allow_cleanup {
        fields.push(ResourceInstanceField::AllowCleanup);
    }
    if let Some(tags) = &desired.tags {
        if tag_set(tags) != tag_set(&instance.tags) {
            fields.push(ResourceInstanceField::Tags);
        }
    }
    Ok(fields)
}

pub async fn is_up_to_date(
    desired: &ResourceInstanceParameters,
    instance: &CloudInstance,
    catalog: &dyn CatalogApi,
) -> Result<bool> {
    Ok(changed_fields(desired, instance, catalog).await?.is_empty())
}

/// Sparse update for the instance API; tag changes go through [`tag_changes`]
pub async fn build_patch(
    desired: &ResourceInstanceParameters,
    instance: &CloudInstance,
    catalog: &dyn CatalogApi,
) -> Result<PatchDocument> {
    let mut patch = PatchDocument::new();

    for field in changed_fields(desired, instance, catalog).await? {
        match field {
            ResourceInstanceField::Name => {
                patch.insert("name".to_string(), Value::String(desired.name.clone()));
            }
            ResourceInstanceField::Plan => {
                let plan_id = catalog
                    .resource_plan_id(&desired.service_name, &desired.resource_plan_name)
                    .await
                    .map_err(CoreError::lookup("cannot look up resource plan id"))?;
                patch.insert("resource_plan_id".to_string(), Value::String(plan_id));
            }
            ResourceInstanceField::Parameters => {
                if let Some(parameters) = &desired.parameters {
                    patch.insert("parameters".to_string(), parameters.clone());
                }
            }
            ResourceInstanceField::AllowCleanup => {
                if let Some(allow_cleanup) = desired.allow_cleanup {
                    patch.insert("allow_cleanup".to_string(), Value::Bool(allow_cleanup));
                }
            }
            ResourceInstanceField::Tags => {}
        }
    }
    Ok(patch)
}

/// Tags to attach and to detach so the instance carries exactly the desired tags
pub fn tag_changes(
    desired: &ResourceInstanceParameters,
    instance: &CloudInstance,
) -> (Vec<String>, Vec<String>) {
    let Some(tags) = &desired.tags else {
        return (Vec::new(), Vec::new());
    };
    let (wanted, present) = (tag_set(tags), tag_set(&instance.tags));

    let attach = wanted.difference(&present).map(|tag| tag.to_string()).collect();
    let detach = present.difference(&wanted).map(|tag| tag.to_string()).collect();
    (attach, detach)
}

/// Whether an instance in this state still counts as existing
pub fn exists(state: ResourceInstanceState) -> bool {
    !matches!(
        state,
        ResourceInstanceState::Removed | ResourceInstanceState::PendingReclamation
    )
}

/// Ready condition for a lifecycle state
pub fn condition(state: ResourceInstanceState) -> Condition {
    match state {
        ResourceInstanceState::Active => Condition::available(),
        ResourceInstanceState::Provisioning | ResourceInstanceState::PreProvisioning => {
            Condition::creating()
        }
        ResourceInstanceState::Removed | ResourceInstanceState::PendingReclamation => {
            Condition::deleting()
        }
        ResourceInstanceState::Inactive
        | ResourceInstanceState::Failed
        | ResourceInstanceState::Unknown => Condition::unavailable(),
    }
}

/// Manages service instances through the resource controller
pub struct ResourceInstanceClient {
    api: Arc<dyn ResourceControllerApi>,
    catalog: Arc<dyn CatalogApi>,
}

impl ResourceInstanceClient {
    pub fn new(api: Arc<dyn ResourceControllerApi>, catalog: Arc<dyn CatalogApi>) -> Self {
        Self { api, catalog }
    }

    async fn fetch(&self, id: &str) -> Result<Option<CloudInstance>> {
        match self.api.get_resource_instance(id).await {
            Ok(instance) if exists(instance.state) => Ok(Some(instance)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(CoreError::cloud("cannot get resource instance")(e)),
        }
    }
}

#[async_trait]
impl ExternalClient<ResourceInstance> for ResourceInstanceClient {
    async fn observe(&self, resource: &mut ResourceInstance) -> Result<ExternalObservation> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(ExternalObservation::absent());
        };
        let Some(instance) = self.fetch(&id).await? else {
            return Ok(ExternalObservation::absent());
        };

        let catalog = self.catalog.as_ref();
        let late_initialized =
            late_initialize(&mut resource.spec.for_provider, &instance, catalog).await?;
        let up_to_date = is_up_to_date(&resource.spec.for_provider, &instance, catalog).await?;

        resource.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&instance));
        resource.set_condition(condition(instance.state));

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&self, resource: &mut ResourceInstance) -> Result<ExternalCreation> {
        let params = &resource.spec.for_provider;
        if params.resource_group_name.is_empty() || params.resource_plan_name.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "resourceGroupName and resourcePlanName are required".to_string(),
            ));
        }

        let resource_group = self
            .catalog
            .resource_group_id(&params.resource_group_name)
            .await
            .map_err(CoreError::lookup("cannot look up resource group id"))?;
        let resource_plan_id = self
            .catalog
            .resource_plan_id(&params.service_name, &params.resource_plan_name)
            .await
            .map_err(CoreError::lookup("cannot look up resource plan id"))?;

        let request = CreateResourceInstanceRequest {
            name: params.name.clone(),
            target: params.target.clone(),
            resource_group,
            resource_plan_id,
            tags: params.tags.clone().filter(|tags| !tags.is_empty()),
            allow_cleanup: params.allow_cleanup,
            parameters: params.parameters.clone(),
            entity_lock: params.entity_lock,
        };

        let instance = self
            .api
            .create_resource_instance(&request)
            .await
            .map_err(CoreError::cloud("cannot create resource instance"))?;

        info!("Created resource instance {} ({})", instance.name, instance.id);
        set_external_name(resource, instance.id);
        resource.set_condition(Condition::creating());
        Ok(ExternalCreation::default())
    }

    async fn update(&self, resource: &mut ResourceInstance) -> Result<()> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };
        let Some(instance) = self.fetch(&id).await? else {
            return Ok(());
        };

        let params = &resource.spec.for_provider;
        let patch = build_patch(params, &instance, self.catalog.as_ref()).await?;
        if !patch.is_empty() {
            debug!("Updating resource instance {} with {:?}", id, patch);
            self.api
                .update_resource_instance(&id, &patch)
                .await
                .map_err(CoreError::cloud("cannot update resource instance"))?;
        }

        let (attach, detach) = tag_changes(params, &instance);
        if !attach.is_empty() {
            self.api
                .attach_tags(&instance.crn, &attach)
                .await
                .map_err(CoreError::cloud("cannot attach tags"))?;
        }
        if !detach.is_empty() {
            self.api
                .detach_tags(&instance.crn, &detach)
                .await
                .map_err(CoreError::cloud("cannot detach tags"))?;
        }
        Ok(())
    }

    async fn delete(&self, resource: &mut ResourceInstance) -> Result<()> {
        resource.set_condition(Condition::deleting());
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        match self.api.delete_resource_instance(&id, false).await {
            Ok(()) => {
                info!("Deleted resource instance {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::cloud("cannot delete resource instance")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_api::common::ConditionReason;
    use provider_api::v1alpha1::resource_instance::ResourceInstanceSpec;
    use provider_cloud::{CloudError, MockCatalogApi, MockResourceControllerApi};
    use serde_json::json;

    const CRN: &str = "crn:v1:bluemix:public:messagehub:us-south:a/1:inst-1::";

    fn observed() -> CloudInstance {
        CloudInstance {
            id: CRN.to_string(),
            crn: CRN.to_string(),
            name: "events".to_string(),
            resource_group_id: "rg-1".to_string(),
            resource_plan_id: "plan-standard".to_string(),
            region_id: "us-south".to_string(),
            state: ResourceInstanceState::Active,
            allow_cleanup: false,
            locked: false,
            parameters: Some(json!({"service-endpoints": "public"})),
            tags: vec!["env:prod".to_string()],
            ..Default::default()
        }
    }

    fn desired() -> ResourceInstanceParameters {
        ResourceInstanceParameters {
            name: "events".to_string(),
            target: "us-south".to_string(),
            service_name: "messagehub".to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> MockCatalogApi {
        let mut catalog = MockCatalogApi::new();
        catalog.expect_resource_plan_name().returning(|service, plan_id| {
            assert_eq!(service, "messagehub");
            match plan_id {
                "plan-standard" => Ok("standard".to_string()),
                "plan-enterprise" => Ok("enterprise".to_string()),
                other => Err(CloudError::NotFound(other.to_string())),
            }
        });
        catalog
            .expect_resource_plan_id()
            .returning(|_, name| Ok(format!("plan-{}", name)));
        catalog
            .expect_resource_group_name()
            .returning(|_| Ok("default".to_string()));
        catalog
            .expect_resource_group_id()
            .returning(|_| Ok("rg-1".to_string()));
        catalog
    }

    fn managed(params: ResourceInstanceParameters, external: Option<&str>) -> ResourceInstance {
        let mut instance = ResourceInstance::new(
            "events",
            ResourceInstanceSpec {
                for_provider: params,
                ..Default::default()
            },
        );
        if let Some(external) = external {
            set_external_name(&mut instance, external);
        }
        instance
    }

    #[tokio::test]
    async fn test_late_initialize_looks_up_names() {
        let mut params = desired();

        let changed = late_initialize(&mut params, &observed(), &catalog()).await.unwrap();

        assert!(changed);
        assert_eq!(params.resource_plan_name, "standard");
        assert_eq!(params.resource_group_name, "default");
        assert_eq!(params.tags, Some(vec!["env:prod".to_string()]));
        assert_eq!(params.allow_cleanup, Some(false));
        assert_eq!(params.parameters, Some(json!({"service-endpoints": "public"})));
    }

    #[tokio::test]
    async fn test_late_initialize_propagates_lookup_failure() {
        let mut catalog = MockCatalogApi::new();
        catalog
            .expect_resource_group_name()
            .returning(|_| Ok("default".to_string()));
        catalog.expect_resource_plan_name().returning(|_, _| {
            Err(CloudError::Api {
                status: 500,
                message: "catalog down".to_string(),
            })
        });
        let mut params = desired();

        let err = late_initialize(&mut params, &observed(), &catalog).await.unwrap_err();

        assert!(matches!(err, CoreError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_up_to_date_after_late_init() {
        let catalog = catalog();
        let mut params = desired();
        late_initialize(&mut params, &observed(), &catalog).await.unwrap();

        assert!(is_up_to_date(&params, &observed(), &catalog).await.unwrap());
        assert!(build_patch(&params, &observed(), &catalog).await.unwrap().is_empty());
        assert_eq!(tag_changes(&params, &observed()), (vec![], vec![]));
    }

    #[tokio::test]
    async fn test_immutable_fields_are_not_compared() {
        let mut params = desired();
        params.target = "eu-de".to_string();
        params.resource_group_name = "other".to_string();
        params.entity_lock = Some(true);

        assert!(is_up_to_date(&params, &observed(), &catalog()).await.unwrap());
    }

    #[tokio::test]
    async fn test_comparison_skips_resource_group_lookup() {
        let mut catalog = MockCatalogApi::new();
        catalog
            .expect_resource_plan_name()
            .returning(|_, _| Ok("standard".to_string()));
        catalog.expect_resource_group_name().never();
        let mut params = desired();
        params.resource_group_name = "default".to_string();
        params.resource_plan_name = "standard".to_string();

        assert!(is_up_to_date(&params, &observed(), &catalog).await.unwrap());

        late_initialize(&mut params, &observed(), &catalog).await.unwrap();
        assert_eq!(params.resource_group_name, "default");
    }

    #[tokio::test]
    async fn test_plan_change_patches_plan_id() {
        let mut params = desired();
        params.resource_plan_name = "enterprise".to_string();
        params.allow_cleanup = Some(true);

        let patch = build_patch(&params, &observed(), &catalog()).await.unwrap();

        assert_eq!(
            Value::Object(patch),
            json!({"resource_plan_id": "plan-enterprise", "allow_cleanup": true})
        );
    }

    #[tokio::test]
    async fn test_parameters_compared_as_subset() {
        let mut params = desired();
        params.parameters = Some(json!({"service-endpoints": "public"}));
        let mut instance = observed();
        instance.parameters = Some(json!({"service-endpoints": "public", "throughput": 150}));
        assert!(is_up_to_date(&params, &instance, &catalog()).await.unwrap());

        params.parameters = Some(json!({"service-endpoints": "private"}));
        let fields = changed_fields(&params, &instance, &catalog()).await.unwrap();
        assert_eq!(fields, vec![ResourceInstanceField::Parameters]);
    }

    #[tokio::test]
    async fn test_tag_changes() {
        let mut params = desired();
        params.tags = Some(vec!["team:data".to_string()]);

        let fields = changed_fields(&params, &observed(), &catalog()).await.unwrap();
        assert_eq!(fields, vec![ResourceInstanceField::Tags]);
        assert!(build_patch(&params, &observed(), &catalog()).await.unwrap().is_empty());
        assert_eq!(
            tag_changes(&params, &observed()),
            (vec!["team:data".to_string()], vec!["env:prod".to_string()])
        );
    }

    #[test]
    fn test_condition_per_state() {
        let cases = [
            (ResourceInstanceState::Active, ConditionReason::Available),
            (ResourceInstanceState::Provisioning, ConditionReason::Creating),
            (ResourceInstanceState::PreProvisioning, ConditionReason::Creating),
            (ResourceInstanceState::Inactive, ConditionReason::Unavailable),
            (ResourceInstanceState::Failed, ConditionReason::Unavailable),
            (ResourceInstanceState::Unknown, ConditionReason::Unavailable),
        ];
        for (state, reason) in cases {
            assert_eq!(condition(state).reason, reason, "{:?}", state);
        }
        assert!(!exists(ResourceInstanceState::Removed));
        assert!(!exists(ResourceInstanceState::PendingReclamation));
        assert!(exists(ResourceInstanceState::Failed));
    }

    #[tokio::test]
    async fn test_observe_removed_instance_is_absent() {
        let mut api = MockResourceControllerApi::new();
        api.expect_get_resource_instance().returning(|_| {
            Ok(CloudInstance {
                state: ResourceInstanceState::Removed,
                ..observed()
            })
        });
        let client = ResourceInstanceClient::new(Arc::new(api), Arc::new(catalog()));
        let mut instance = managed(desired(), Some(CRN));

        let observation = client.observe(&mut instance).await.unwrap();

        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn test_observe_failed_instance_is_unavailable() {
        let mut api = MockResourceControllerApi::new();
        api.expect_get_resource_instance().returning(|_| {
            Ok(CloudInstance {
                state: ResourceInstanceState::Failed,
                ..observed()
            })
        });
        let client = ResourceInstanceClient::new(Arc::new(api), Arc::new(catalog()));
        let mut instance = managed(desired(), Some(CRN));

        let observation = client.observe(&mut instance).await.unwrap();

        assert!(observation.resource_exists);
        assert!(observation.resource_up_to_date);
        let status = instance.status.unwrap();
        assert_eq!(status.conditions[0].reason, ConditionReason::Unavailable);
        assert_eq!(status.at_provider.unwrap().state, "failed");
    }

    #[tokio::test]
    async fn test_create_resolves_ids() {
        let mut api = MockResourceControllerApi::new();
        api.expect_create_resource_instance().times(1).returning(|request| {
            assert_eq!(request.resource_group, "rg-1");
            assert_eq!(request.resource_plan_id, "plan-standard");
            assert_eq!(request.target, "us-south");
            assert_eq!(request.tags, None);
            Ok(observed())
        });
        let client = ResourceInstanceClient::new(Arc::new(api), Arc::new(catalog()));
        let mut params = desired();
        params.resource_group_name = "default".to_string();
        params.resource_plan_name = "standard".to_string();
        let mut instance = managed(params, None);

        client.create(&mut instance).await.unwrap();

        assert_eq!(external_name(&instance), Some(CRN));
    }

    #[tokio::test]
    async fn test_create_requires_plan_and_group() {
        let client = ResourceInstanceClient::new(
            Arc::new(MockResourceControllerApi::new()),
            Arc::new(MockCatalogApi::new()),
        );
        let mut instance = managed(desired(), None);

        let err = client.create(&mut instance).await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_update_converges_tags() {
        let mut api = MockResourceControllerApi::new();
        api.expect_get_resource_instance().returning(|_| Ok(observed()));
        api.expect_update_resource_instance().never();
        api.expect_attach_tags().times(1).returning(|crn, tags| {
            assert_eq!(crn, CRN);
            assert_eq!(tags, ["team:data".to_string()]);
            Ok(())
        });
        api.expect_detach_tags().times(1).returning(|_, tags| {
            assert_eq!(tags, ["env:prod".to_string()]);
            Ok(())
        });
        let client = ResourceInstanceClient::new(Arc::new(api), Arc::new(catalog()));
        let mut params = desired();
        params.tags = Some(vec!["team:data".to_string()]);
        let mut instance = managed(params, Some(CRN));

        client.update(&mut instance).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_is_not_recursive() {
        let mut api = MockResourceControllerApi::new();
        api.expect_delete_resource_instance().times(1).returning(|id, recursive| {
            assert_eq!(id, CRN);
            assert!(!recursive);
            Ok(())
        });
        let client = ResourceInstanceClient::new(Arc::new(api), Arc::new(MockCatalogApi::new()));
        let mut instance = managed(desired(), Some(CRN));

        client.delete(&mut instance).await.unwrap();
    }
}
