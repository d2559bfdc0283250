//! Resource key reconciliation
//!
//! Keys are immutable apart from their name. Their credentials are
//! published as connection details on every observation.

use async_trait::async_trait;
use provider_api::common::{external_name, set_external_name, Condition, Managed};
use provider_api::v1alpha1::resource_key::{ResourceKeyCreateParameters, ResourceKeyObservation};
use provider_api::v1alpha1::{ResourceInstance, ResourceKey, ResourceKeyParameters};
use provider_cloud::models::{
    CreateResourceKeyRequest, PatchDocument, ResourceKey as CloudKey, ResourceKeyState,
};
use provider_cloud::ResourceControllerApi;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::fields::{late_init, late_init_string, unset_or_equal};
use crate::reference::{extract_external_name, resolve, ReferenceSource, ResolutionRequest};
use crate::{
    extract_connection_details, ConnectionDetails, CoreError, ExternalClient, ExternalCreation,
    ExternalObservation, ReferenceResolution, Result,
};

/// Fields of a key that can change after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKeyField {
    Name,
}

fn credential(key: &CloudKey, field: &str) -> Option<String> {
    key.credentials
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Create request for the desired state
pub fn generate_request(params: &ResourceKeyParameters) -> Result<CreateResourceKeyRequest> {
    let source = params
        .source
        .clone()
        .filter(|source| !source.is_empty())
        .ok_or_else(|| {
            CoreError::InvalidConfiguration(
                "resource key has no source; set source, sourceRef or sourceSelector".to_string(),
            )
        })?;

    let parameters = params
        .parameters
        .as_ref()
        .and_then(|p| p.service_id_crn.as_ref())
        .map(|crn| json!({ "serviceid_crn": crn }));

    Ok(CreateResourceKeyRequest {
        name: params.name.clone(),
        source,
        role: params.role.clone().filter(|role| !role.is_empty()),
        parameters,
    })
}

pub fn generate_observation(key: &CloudKey) -> ResourceKeyObservation {
    ResourceKeyObservation {
        id: key.id.clone(),
        guid: key.guid.clone(),
        crn: key.crn.clone(),
        url: key.url.clone(),
        account_id: key.account_id.clone(),
        resource_group_id: key.resource_group_id.clone(),
        source_crn: key.source_crn.clone(),
        state: key.state.as_str().to_string(),
        iam_compatible: key.iam_compatible,
        created_at: key.created_at.clone(),
        kafka_admin_url: credential(key, "kafka_admin_url"),
    }
}

/// Desired state that would produce the observed key
pub fn generate_parameters(key: &CloudKey) -> ResourceKeyParameters {
    ResourceKeyParameters {
        name: key.name.clone(),
        source: Some(key.source_crn.clone()).filter(|source| !source.is_empty()),
        source_ref: None,
        source_selector: None,
        role: credential(key, "iam_role_crn"),
        parameters: credential(key, "iam_serviceid_crn").map(|crn| ResourceKeyCreateParameters {
            service_id_crn: Some(crn),
        }),
    }
}

/// Fill unset desired fields from the observed key
pub fn late_initialize(params: &mut ResourceKeyParameters, key: &CloudKey) -> bool {
    let mut changed = late_init_string(&mut params.source, &key.source_crn);
    changed |= late_init(&mut params.role, credential(key, "iam_role_crn"));
    changed
}

pub fn changed_fields(desired: &ResourceKeyParameters, key: &CloudKey) -> Vec<ResourceKeyField> {
    let actual = generate_parameters(key);
    let mut fields = Vec::new();
    if !unset_or_equal(Some(desired.name.as_str()), Some(actual.name.as_str())) {
        fields.push(ResourceKeyField::Name);
    }
    fields
}

pub fn is_up_to_date(desired: &ResourceKeyParameters, key: &CloudKey) -> bool {
    changed_fields(desired, key).is_empty()
}

pub fn build_patch(desired: &ResourceKeyParameters, key: &CloudKey) -> PatchDocument {
    let mut patch = PatchDocument::new();
    for field in changed_fields(desired, key) {
        match field {
            ResourceKeyField::Name => {
                patch.insert("name".to_string(), Value::String(desired.name.clone()));
            }
        }
    }
    patch
}

/// Ready condition for a lifecycle state
pub fn condition(state: ResourceKeyState) -> Condition {
    match state {
        ResourceKeyState::Active => Condition::available(),
        ResourceKeyState::Removed => Condition::deleting(),
        ResourceKeyState::Inactive | ResourceKeyState::Unknown => Condition::unavailable(),
    }
}

/// Connection details of a key; a rendering failure publishes nothing
/// and leaves the rest of the reconciliation untouched
fn connection_details(resource: &ResourceKey, key: &CloudKey) -> ConnectionDetails {
    let templates = resource.spec.connection_templates.clone().unwrap_or_default();
    extract_connection_details(&templates, &key.credentials).unwrap_or_else(|e| {
        warn!("Cannot extract connection details of resource key {}: {}", key.id, e);
        ConnectionDetails::new()
    })
}

/// Manages resource keys through the resource controller
pub struct ResourceKeyClient {
    api: Arc<dyn ResourceControllerApi>,
    instances: Arc<dyn ReferenceSource<ResourceInstance>>,
}

impl ResourceKeyClient {
    pub fn new(
        api: Arc<dyn ResourceControllerApi>,
        instances: Arc<dyn ReferenceSource<ResourceInstance>>,
    ) -> Self {
        Self { api, instances }
    }

    async fn fetch(&self, id: &str) -> Result<Option<CloudKey>> {
        match self.api.get_resource_key(id).await {
            Ok(key) if key.state == ResourceKeyState::Removed => Ok(None),
            Ok(key) => Ok(Some(key)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(CoreError::cloud("cannot get resource key")(e)),
        }
    }
}

#[async_trait]
impl ExternalClient<ResourceKey> for ResourceKeyClient {
    async fn resolve_references(&self, resource: &mut ResourceKey) -> Result<ReferenceResolution> {
        let params = &mut resource.spec.for_provider;
        let current = params.source.clone().unwrap_or_default();

        let response = resolve(
            self.instances.as_ref(),
            ResolutionRequest {
                field: "source",
                current_value: &current,
                reference: params.source_ref.as_ref(),
                selector: params.source_selector.as_ref(),
                extract: extract_external_name::<ResourceInstance>,
            },
        )
        .await?;

        let mut resolution = ReferenceResolution::default();
        if response.is_pending() {
            resolution.pending.push("source");
            return Ok(resolution);
        }

        if response.resolved_value != current {
            debug!("Resolved resource key source to {}", response.resolved_value);
            params.source = Some(response.resolved_value);
            resolution.changed = true;
        }
        if response.resolved_reference != params.source_ref {
            params.source_ref = response.resolved_reference;
            resolution.changed = true;
        }
        Ok(resolution)
    }

    async fn observe(&self, resource: &mut ResourceKey) -> Result<ExternalObservation> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(ExternalObservation::absent());
        };
        let Some(key) = self.fetch(&id).await? else {
            return Ok(ExternalObservation::absent());
        };

        let late_initialized = late_initialize(&mut resource.spec.for_provider, &key);
        let connection_details = connection_details(resource, &key);

        resource.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&key));
        resource.set_condition(condition(key.state));

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&resource.spec.for_provider, &key),
            resource_late_initialized: late_initialized,
            connection_details,
        })
    }

    async fn create(&self, resource: &mut ResourceKey) -> Result<ExternalCreation> {
        let request = generate_request(&resource.spec.for_provider)?;
        let key = self
            .api
            .create_resource_key(&request)
            .await
            .map_err(CoreError::cloud("cannot create resource key"))?;

        info!("Created resource key {} for {}", key.id, request.source);
        let connection_details = connection_details(resource, &key);
        set_external_name(resource, key.id);
        resource.set_condition(Condition::creating());
        Ok(ExternalCreation { connection_details })
    }

    async fn update(&self, resource: &mut ResourceKey) -> Result<()> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };
        let Some(key) = self.fetch(&id).await? else {
            return Ok(());
        };

        let patch = build_patch(&resource.spec.for_provider, &key);
        if patch.is_empty() {
            return Ok(());
        }

        debug!("Updating resource key {} with {:?}", id, patch);
        self.api
            .update_resource_key(&id, &patch)
            .await
            .map_err(CoreError::cloud("cannot update resource key"))?;
        Ok(())
    }

    async fn delete(&self, resource: &mut ResourceKey) -> Result<()> {
        resource.set_condition(Condition::deleting());
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        match self.api.delete_resource_key(&id).await {
            Ok(()) => {
                info!("Deleted resource key {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::cloud("cannot delete resource key")(e)),
        }
    }
}
