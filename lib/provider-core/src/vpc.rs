//! VPC desired-state mapping and cloud client

use async_trait::async_trait;
use provider_api::common::{external_name, set_external_name, Condition, Managed};
use provider_api::v1alpha1::vpc::VPCObservation;
use provider_api::v1alpha1::{VPCParameters, VPC};
use provider_cloud::models::{PatchDocument, Vpc, VpcPrototype, VpcState};
use provider_cloud::VpcApi;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::fields::{
    identities_equal, identity_from_reference, identity_to_request, late_init, late_init_identity,
    late_init_string, non_empty, unset_or_equal,
};
use crate::{CoreError, ExternalClient, ExternalCreation, ExternalObservation, Result};

/// Fields of a VPC that can change after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VpcField {
    Name,
}

/// Create request for the desired state
pub fn generate_prototype(params: &VPCParameters) -> VpcPrototype {
    VpcPrototype {
        name: params.name.clone().filter(|name| !name.is_empty()),
        address_prefix_management: params
            .address_prefix_management
            .map(|mode| mode.as_str().to_string()),
        classic_access: params.classic_access,
        resource_group: params.resource_group.as_ref().map(identity_to_request),
    }
}

pub fn generate_observation(vpc: &Vpc) -> VPCObservation {
    VPCObservation {
        id: vpc.id.clone(),
        crn: vpc.crn.clone(),
        href: vpc.href.clone(),
        status: vpc.status.as_str().to_string(),
        created_at: vpc.created_at.clone(),
        classic_access: vpc.classic_access,
        default_network_acl: vpc.default_network_acl.as_ref().map(|r| r.id.clone()),
        default_routing_table: vpc.default_routing_table.as_ref().map(|r| r.id.clone()),
        default_security_group: vpc.default_security_group.as_ref().map(|r| r.id.clone()),
        resource_group: vpc.resource_group.as_ref().map(|r| r.id.clone()),
    }
}

/// Desired state that would produce the observed VPC
pub fn generate_parameters(vpc: &Vpc) -> VPCParameters {
    VPCParameters {
        name: non_empty(&vpc.name),
        address_prefix_management: None,
        classic_access: Some(vpc.classic_access),
        resource_group: vpc.resource_group.as_ref().map(identity_from_reference),
    }
}

/// Fill unset desired fields from the observed VPC
pub fn late_initialize(params: &mut VPCParameters, vpc: &Vpc) -> bool {
    let mut changed = late_init_string(&mut params.name, &vpc.name);
    changed |= late_init(&mut params.classic_access, Some(vpc.classic_access));
    changed |= late_init_identity(&mut params.resource_group, vpc.resource_group.as_ref());
    changed
}

/// Mutable fields where desired and observed disagree
pub fn changed_fields(desired: &VPCParameters, vpc: &Vpc) -> Vec<VpcField> {
    let actual = generate_parameters(vpc);
    let mut fields = Vec::new();
    if !unset_or_equal(desired.name.as_deref(), actual.name.as_deref()) {
        fields.push(VpcField::Name);
    }
    fields
}

/// Immutable fields that no longer match; reported, never patched
pub fn drifted_immutable_fields(desired: &VPCParameters, vpc: &Vpc) -> Vec<&'static str> {
    let actual = generate_parameters(vpc);
    let mut drifted = Vec::new();
    if desired.classic_access.is_some() && desired.classic_access != actual.classic_access {
        drifted.push("classicAccess");
    }
    if desired.resource_group.is_some()
        && !identities_equal(desired.resource_group.as_ref(), actual.resource_group.as_ref())
    {
        drifted.push("resourceGroup");
    }
    drifted
}

pub fn is_up_to_date(desired: &VPCParameters, vpc: &Vpc) -> bool {
    changed_fields(desired, vpc).is_empty()
}

/// Sparse update carrying only the mutable fields that differ
pub fn build_patch(desired: &VPCParameters, vpc: &Vpc) -> PatchDocument {
    let mut patch = PatchDocument::new();
    for field in changed_fields(desired, vpc) {
        match field {
            VpcField::Name => {
                if let Some(name) = &desired.name {
                    patch.insert("name".to_string(), Value::String(name.clone()));
                }
            }
        }
    }
    patch
}

/// Ready condition for a lifecycle state
pub fn condition(state: VpcState) -> Condition {
    match state {
        VpcState::Available => Condition::available(),
        VpcState::Pending => Condition::creating(),
        VpcState::Deleting => Condition::deleting(),
        VpcState::Failed | VpcState::Unknown => Condition::unavailable(),
    }
}

/// Manages VPCs through the VPC API
pub struct VpcClient {
    api: Arc<dyn VpcApi>,
}

impl VpcClient {
    pub fn new(api: Arc<dyn VpcApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ExternalClient<VPC> for VpcClient {
    async fn observe(&self, resource: &mut VPC) -> Result<ExternalObservation> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(ExternalObservation::absent());
        };

        let vpc = match self.api.get_vpc(&id).await {
            Ok(vpc) => vpc,
            Err(e) if e.is_not_found() => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(CoreError::cloud("cannot get VPC")(e)),
        };

        let late_initialized = late_initialize(&mut resource.spec.for_provider, &vpc);
        let drifted = drifted_immutable_fields(&resource.spec.for_provider, &vpc);
        if !drifted.is_empty() {
            debug!("VPC {} differs in immutable fields {:?}", id, drifted);
        }

        resource.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&vpc));
        resource.set_condition(condition(vpc.status));

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&resource.spec.for_provider, &vpc),
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&self, resource: &mut VPC) -> Result<ExternalCreation> {
        let prototype = generate_prototype(&resource.spec.for_provider);
        let vpc = self
            .api
            .create_vpc(&prototype)
            .await
            .map_err(CoreError::cloud("cannot create VPC"))?;

        info!("Created VPC {}", vpc.id);
        set_external_name(resource, vpc.id);
        resource.set_condition(Condition::creating());
        Ok(ExternalCreation::default())
    }

    async fn update(&self, resource: &mut VPC) -> Result<()> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        let vpc = self
            .api
            .get_vpc(&id)
            .await
            .map_err(CoreError::cloud("cannot get VPC"))?;

        let patch = build_patch(&resource.spec.for_provider, &vpc);
        if patch.is_empty() {
            return Ok(());
        }

        debug!("Updating VPC {} with {:?}", id, patch);
        self.api
            .update_vpc(&id, &patch)
            .await
            .map_err(CoreError::cloud("cannot update VPC"))?;
        Ok(())
    }

    async fn delete(&self, resource: &mut VPC) -> Result<()> {
        resource.set_condition(Condition::deleting());
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        match self.api.delete_vpc(&id).await {
            Ok(()) => {
                info!("Deleted VPC {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::cloud("cannot delete VPC")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_api::common::{ConditionReason, Identity, EXTERNAL_NAME_ANNOTATION};
    use provider_api::v1alpha1::vpc::{AddressPrefixManagement, VPCSpec};
    use provider_cloud::models::ResourceReference;
    use provider_cloud::{CloudError, MockVpcApi};

    fn observed() -> Vpc {
        Vpc {
            id: "r006-1".to_string(),
            crn: "crn:v1:bluemix:public:is:us-south:a/1::vpc:r006-1".to_string(),
            name: "main".to_string(),
            classic_access: false,
            status: VpcState::Available,
            resource_group: Some(ResourceReference::by_id("rg-1")),
            default_network_acl: Some(ResourceReference::by_id("acl-1")),
            ..Default::default()
        }
    }

    fn managed(params: VPCParameters, external: Option<&str>) -> VPC {
        let mut vpc = VPC::new(
            "main",
            VPCSpec {
                for_provider: params,
                ..Default::default()
            },
        );
        if let Some(external) = external {
            set_external_name(&mut vpc, external);
        }
        vpc
    }

    #[test]
    fn test_prototype_from_desired() {
        let params = VPCParameters {
            name: Some("main".to_string()),
            address_prefix_management: Some(AddressPrefixManagement::Manual),
            classic_access: Some(true),
            resource_group: Some(Identity::id("rg-1")),
        };

        let prototype = generate_prototype(&params);

        assert_eq!(
            serde_json::to_value(&prototype).unwrap(),
            serde_json::json!({
                "name": "main",
                "address_prefix_management": "manual",
                "classic_access": true,
                "resource_group": {"id": "rg-1"}
            })
        );
    }

    #[test]
    fn test_late_initialize_fills_unset_fields() {
        let mut params = VPCParameters::default();

        assert!(late_initialize(&mut params, &observed()));
        assert_eq!(params.name.as_deref(), Some("main"));
        assert_eq!(params.classic_access, Some(false));
        assert_eq!(params.resource_group, Some(Identity::id("rg-1")));

        assert!(!late_initialize(&mut params, &observed()));
    }

    #[test]
    fn test_late_initialize_keeps_user_values() {
        let mut params = VPCParameters {
            name: Some("renamed".to_string()),
            classic_access: Some(true),
            ..Default::default()
        };

        late_initialize(&mut params, &observed());

        assert_eq!(params.name.as_deref(), Some("renamed"));
        assert_eq!(params.classic_access, Some(true));
    }

    #[test]
    fn test_up_to_date_after_late_init() {
        let mut params = VPCParameters::default();
        late_initialize(&mut params, &observed());
        assert!(is_up_to_date(&params, &observed()));
        assert!(build_patch(&params, &observed()).is_empty());
    }

    #[test]
    fn test_rename_builds_name_patch() {
        let params = VPCParameters {
            name: Some("renamed".to_string()),
            ..Default::default()
        };

        assert!(!is_up_to_date(&params, &observed()));
        let patch = build_patch(&params, &observed());
        assert_eq!(serde_json::Value::Object(patch), serde_json::json!({"name": "renamed"}));
    }

    #[test]
    fn test_immutable_drift_does_not_affect_up_to_date() {
        let params = VPCParameters {
            classic_access: Some(true),
            resource_group: Some(Identity::id("rg-2")),
            ..Default::default()
        };

        assert!(is_up_to_date(&params, &observed()));
        assert_eq!(
            drifted_immutable_fields(&params, &observed()),
            vec!["classicAccess", "resourceGroup"]
        );
    }

    #[test]
    fn test_condition_per_state() {
        assert_eq!(condition(VpcState::Available).reason, ConditionReason::Available);
        assert_eq!(condition(VpcState::Pending).reason, ConditionReason::Creating);
        assert_eq!(condition(VpcState::Deleting).reason, ConditionReason::Deleting);
        assert_eq!(condition(VpcState::Failed).reason, ConditionReason::Unavailable);
    }

    #[tokio::test]
    async fn test_observe_without_external_name() {
        let client = VpcClient::new(Arc::new(MockVpcApi::new()));
        let mut vpc = managed(VPCParameters::default(), None);

        let observation = client.observe(&mut vpc).await.unwrap();

        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn test_observe_missing_vpc() {
        let mut api = MockVpcApi::new();
        api.expect_get_vpc()
            .returning(|id| Err(CloudError::NotFound(id.to_string())));
        let client = VpcClient::new(Arc::new(api));
        let mut vpc = managed(VPCParameters::default(), Some("r006-1"));

        let observation = client.observe(&mut vpc).await.unwrap();

        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn test_observe_late_initializes_and_reports_status() {
        let mut api = MockVpcApi::new();
        api.expect_get_vpc().returning(|id| {
            assert_eq!(id, "r006-1");
            Ok(observed())
        });
        let client = VpcClient::new(Arc::new(api));
        let mut vpc = managed(VPCParameters::default(), Some("r006-1"));

        let observation = client.observe(&mut vpc).await.unwrap();

        assert!(observation.resource_exists);
        assert!(observation.resource_up_to_date);
        assert!(observation.resource_late_initialized);
        assert_eq!(vpc.spec.for_provider.name.as_deref(), Some("main"));
        let status = vpc.status.as_ref().unwrap();
        assert_eq!(status.at_provider.as_ref().unwrap().default_network_acl.as_deref(), Some("acl-1"));
        assert_eq!(status.conditions[0].reason, ConditionReason::Available);
    }

    #[tokio::test]
    async fn test_create_records_external_name() {
        let mut api = MockVpcApi::new();
        api.expect_create_vpc().times(1).returning(|prototype| {
            assert_eq!(prototype.name.as_deref(), Some("main"));
            Ok(observed())
        });
        let client = VpcClient::new(Arc::new(api));
        let mut vpc = managed(
            VPCParameters {
                name: Some("main".to_string()),
                ..Default::default()
            },
            None,
        );

        client.create(&mut vpc).await.unwrap();

        assert_eq!(
            vpc.metadata.annotations.as_ref().unwrap().get(EXTERNAL_NAME_ANNOTATION),
            Some(&"r006-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_name() {
        let mut api = MockVpcApi::new();
        api.expect_get_vpc().returning(|_| Ok(observed()));
        api.expect_update_vpc().times(1).returning(|id, patch| {
            assert_eq!(id, "r006-1");
            assert_eq!(patch.len(), 1);
            assert_eq!(patch.get("name"), Some(&serde_json::json!("renamed")));
            Ok(observed())
        });
        let client = VpcClient::new(Arc::new(api));
        let mut vpc = managed(
            VPCParameters {
                name: Some("renamed".to_string()),
                ..Default::default()
            },
            Some("r006-1"),
        );

        client.update(&mut vpc).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_vpc() {
        let mut api = MockVpcApi::new();
        api.expect_delete_vpc()
            .returning(|id| Err(CloudError::NotFound(id.to_string())));
        let client = VpcClient::new(Arc::new(api));
        let mut vpc = managed(VPCParameters::default(), Some("r006-1"));

        client.delete(&mut vpc).await.unwrap();

        assert_eq!(vpc.status.unwrap().conditions[0].reason, ConditionReason::Deleting);
    }
}
