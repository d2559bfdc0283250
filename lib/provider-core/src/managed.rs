//! Contract between the generic reconcile loop and each kind's cloud client

use async_trait::async_trait;

use crate::{ConnectionDetails, Result};

/// What an observation found out about the cloud object
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalObservation {
    pub resource_exists: bool,
    pub resource_up_to_date: bool,
    /// Desired state was filled in from the observed object
    pub resource_late_initialized: bool,
    pub connection_details: ConnectionDetails,
}

impl ExternalObservation {
    /// The cloud object does not exist
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Result of creating the cloud object
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalCreation {
    pub connection_details: ConnectionDetails,
}

/// Outcome of resolving a resource's references
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceResolution {
    /// Desired state changed and must be persisted
    pub changed: bool,
    /// Fields whose referenced object has not produced a value yet
    pub pending: Vec<&'static str>,
}

/// Drives one managed kind against its cloud API.
///
/// Every operation may update the managed resource in place: the
/// external-name annotation, late-initialized desired state, observed
/// status and conditions. The caller persists those changes.
#[async_trait]
pub trait ExternalClient<K: Send + Sync + 'static>: Send + Sync {
    async fn resolve_references(&self, _resource: &mut K) -> Result<ReferenceResolution> {
        Ok(ReferenceResolution::default())
    }

    async fn observe(&self, resource: &mut K) -> Result<ExternalObservation>;

    async fn create(&self, resource: &mut K) -> Result<ExternalCreation>;

    async fn update(&self, resource: &mut K) -> Result<()>;

    /// Delete the cloud object; an object that is already gone is not an error
    async fn delete(&self, resource: &mut K) -> Result<()>;
}
