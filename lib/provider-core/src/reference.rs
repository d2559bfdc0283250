//! Cross-resource reference resolution
//!
//! A field may be given directly, through a named reference to another
//! managed resource, or through a label selector. Resolution turns either
//! indirect form into the concrete value and records the reference that
//! produced it.

use async_trait::async_trait;
use kube::api::ListParams;
use kube::{Api, Resource, ResourceExt};
use provider_api::common::{external_name, Managed, Reference, Selector};
use provider_api::v1alpha1::ResourceKey;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

use crate::{CoreError, Result};

/// Where referenced objects are read from
#[async_trait]
pub trait ReferenceSource<K>: Send + Sync {
    /// Fetch a single object; `NotFound` when it does not exist
    async fn get(&self, name: &str) -> Result<K>;

    /// Current set of candidate objects
    async fn list(&self) -> Result<Vec<K>>;
}

#[async_trait]
impl<K> ReferenceSource<K> for Api<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K> {
        Api::get_opt(self, name)
            .await?
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<K>> {
        Ok(Api::list(self, &ListParams::default()).await?.items)
    }
}

/// One field to resolve
pub struct ResolutionRequest<'a, K> {
    /// Field name, used in errors
    pub field: &'static str,
    pub current_value: &'a str,
    pub reference: Option<&'a Reference>,
    pub selector: Option<&'a Selector>,
    /// Pulls the value out of the referenced object
    pub extract: fn(&K) -> String,
}

/// Result of resolving a field
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolutionResponse {
    pub resolved_value: String,
    pub resolved_reference: Option<Reference>,
}

impl ResolutionResponse {
    /// The referenced object exists but has not produced the value yet
    pub fn is_pending(&self) -> bool {
        self.resolved_value.is_empty()
    }
}

/// Resolve a field from its current value, reference or selector.
///
/// A value that is already set and has no selector is kept as-is. A
/// reference takes precedence over a selector. A selector is evaluated
/// against a fresh listing and must match exactly one object.
pub async fn resolve<K, S>(source: &S, request: ResolutionRequest<'_, K>) -> Result<ResolutionResponse>
where
    K: ResourceExt + Send + Sync,
    S: ReferenceSource<K> + ?Sized,
{
    let field = request.field;

    if !request.current_value.is_empty() && request.selector.is_none() {
        return Ok(ResolutionResponse {
            resolved_value: request.current_value.to_string(),
            resolved_reference: request.reference.cloned(),
        });
    }

    if let Some(reference) = request.reference {
        let target = source
            .get(&reference.name)
            .await
            .map_err(|e| CoreError::ResolutionFailed {
                field,
                source: Box::new(e),
            })?;

        let resolved_value = (request.extract)(&target);
        if resolved_value.is_empty() {
            debug!("Reference {} for {} has no value yet", reference.name, field);
        }

        return Ok(ResolutionResponse {
            resolved_value,
            resolved_reference: Some(reference.clone()),
        });
    }

    let Some(selector) = request.selector else {
        return Ok(ResolutionResponse::default());
    };

    let candidates = source
        .list()
        .await
        .map_err(|e| CoreError::ResolutionFailed {
            field,
            source: Box::new(e),
        })?;

    let mut matched: Vec<K> = candidates
        .into_iter()
        .filter(|candidate| selector.matches(candidate.labels()))
        .collect();

    match matched.len() {
        0 => Err(CoreError::NotFound(format!("no object matches the {} selector", field))),
        1 => {
            let target = matched.remove(0);
            let resolved_value = (request.extract)(&target);
            debug!("Selector for {} matched {}", field, target.name_any());
            Ok(ResolutionResponse {
                resolved_value,
                resolved_reference: Some(Reference::new(target.name_any())),
            })
        }
        count => Err(CoreError::AmbiguousReference { field, count }),
    }
}

/// The cloud identifier recorded on the referenced object
pub fn extract_external_name<K: ResourceExt>(obj: &K) -> String {
    external_name(obj).unwrap_or_default().to_string()
}

/// The connection secret reference of the referenced object, as JSON
pub fn extract_connection_secret<K: Managed>(obj: &K) -> String {
    obj.connection_secret_ref()
        .map(|secret| {
            serde_json::json!({
                "name": secret.name,
                "namespace": secret.namespace,
            })
            .to_string()
        })
        .unwrap_or_default()
}

/// Admin URL reported by an Event Streams resource key
pub fn extract_kafka_admin_url(key: &ResourceKey) -> String {
    key.status
        .as_ref()
        .and_then(|status| status.at_provider.as_ref())
        .and_then(|observation| observation.kafka_admin_url.clone())
        .unwrap_or_default()
}
