//! Subnet reconciliation

pub mod mapper;

pub use mapper::{
    build_patch, changed_fields, generate_observation, generate_parameters, generate_prototype,
    is_up_to_date, late_initialize, SubnetField,
};

use async_trait::async_trait;
use provider_api::common::{external_name, set_external_name, Condition, Identity, Managed};
use provider_api::v1alpha1::{Subnet, VPC};
use provider_cloud::models::SubnetState;
use provider_cloud::VpcApi;
use std::sync::Arc;
use tracing::{debug, info};

use crate::reference::{extract_external_name, resolve, ReferenceSource, ResolutionRequest};
use crate::{
    CoreError, ExternalClient, ExternalCreation, ExternalObservation, ReferenceResolution, Result,
};

/// Ready condition for a lifecycle state
pub fn condition(state: SubnetState) -> Condition {
    match state {
        SubnetState::Available => Condition::available(),
        SubnetState::Pending => Condition::creating(),
        SubnetState::Deleting => Condition::deleting(),
        SubnetState::Failed | SubnetState::Unknown => Condition::unavailable(),
    }
}

/// Manages subnets through the VPC API
pub struct SubnetClient {
    api: Arc<dyn VpcApi>,
    vpcs: Arc<dyn ReferenceSource<VPC>>,
}

impl SubnetClient {
    pub fn new(api: Arc<dyn VpcApi>, vpcs: Arc<dyn ReferenceSource<VPC>>) -> Self {
        Self { api, vpcs }
    }
}

#[async_trait]
impl ExternalClient<Subnet> for SubnetClient {
    async fn resolve_references(&self, resource: &mut Subnet) -> Result<ReferenceResolution> {
        let common = resource.spec.for_provider.common_mut();
        let current = common
            .vpc
            .as_ref()
            .map(|vpc| vpc.canonical_id().to_string())
            .unwrap_or_default();

        let response = resolve(
            self.vpcs.as_ref(),
            ResolutionRequest {
                field: "vpc",
                current_value: &current,
                reference: common.vpc_ref.as_ref(),
                selector: common.vpc_selector.as_ref(),
                extract: extract_external_name::<VPC>,
            },
        )
        .await?;

        let mut resolution = ReferenceResolution::default();
        if response.is_pending() {
            resolution.pending.push("vpc");
            return Ok(resolution);
        }

        if response.resolved_value != current {
            debug!("Resolved subnet VPC to {}", response.resolved_value);
            common.vpc = Some(Identity::id(response.resolved_value));
            resolution.changed = true;
        }
        if response.resolved_reference != common.vpc_ref {
            common.vpc_ref = response.resolved_reference;
            resolution.changed = true;
        }
        Ok(resolution)
    }

    async fn observe(&self, resource: &mut Subnet) -> Result<ExternalObservation> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(ExternalObservation::absent());
        };

        let subnet = match self.api.get_subnet(&id).await {
            Ok(subnet) => subnet,
            Err(e) if e.is_not_found() => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(CoreError::cloud("cannot get subnet")(e)),
        };

        let late_initialized = late_initialize(&mut resource.spec.for_provider, &subnet);
        let drifted = mapper::drifted_immutable_fields(&resource.spec.for_provider, &subnet);
        if !drifted.is_empty() {
            debug!("Subnet {} differs in immutable fields {:?}", id, drifted);
        }

        resource.status.get_or_insert_with(Default::default).at_provider =
            Some(generate_observation(&subnet));
        resource.set_condition(condition(subnet.status));

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&resource.spec.for_provider, &subnet),
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&self, resource: &mut Subnet) -> Result<ExternalCreation> {
        let prototype = generate_prototype(&resource.spec.for_provider)?;
        let subnet = self
            .api
            .create_subnet(&prototype)
            .await
            .map_err(CoreError::cloud("cannot create subnet"))?;

        info!("Created subnet {} in VPC {}", subnet.id, subnet.vpc.id);
        set_external_name(resource, subnet.id);
        resource.set_condition(Condition::creating());
        Ok(ExternalCreation::default())
    }

    async fn update(&self, resource: &mut Subnet) -> Result<()> {
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        let subnet = self
            .api
            .get_subnet(&id)
            .await
            .map_err(CoreError::cloud("cannot get subnet"))?;

        let patch = build_patch(&resource.spec.for_provider, &subnet);
        if patch.is_empty() {
            return Ok(());
        }

        debug!("Updating subnet {} with {:?}", id, patch);
        self.api
            .update_subnet(&id, &patch)
            .await
            .map_err(CoreError::cloud("cannot update subnet"))?;
        Ok(())
    }

    async fn delete(&self, resource: &mut Subnet) -> Result<()> {
        resource.set_condition(Condition::deleting());
        let Some(id) = external_name(resource).map(str::to_string) else {
            return Ok(());
        };

        match self.api.delete_subnet(&id).await {
            Ok(()) => {
                info!("Deleted subnet {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CoreError::cloud("cannot delete subnet")(e)),
        }
    }
}
