//! Writes the reconciler makes back to the cluster

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
#[cfg(test)]
use mockall::automock;
use kube::api::{ObjectMeta, Patch, PatchParams};
use kube::{Api, Client, Resource};
use provider_api::common::SecretReference;
use provider_core::ConnectionDetails;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

use crate::error::Result;

/// Field manager for every write made by the controller
pub const FIELD_MANAGER: &str = "provider-controller";

/// Finalizer guarding deletion of the cloud object
pub const FINALIZER: &str = "finalizer.managedresource.cloud.datum.net";

/// Cluster writes for one managed kind
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KubeClient: Send + Sync {
    async fn add_finalizer(&self, name: &str) -> Result<()>;

    async fn remove_finalizer(&self, name: &str) -> Result<()>;

    /// Merge-patch metadata and spec of a managed resource
    async fn patch(&self, name: &str, patch: &Value) -> Result<()>;

    async fn patch_status(&self, name: &str, status: &Value) -> Result<()>;

    /// Create or replace the connection secret
    async fn apply_secret(&self, secret: &SecretReference, data: &ConnectionDetails) -> Result<()>;

    /// Delete the connection secret; a missing secret is not an error
    async fn delete_secret(&self, secret: &SecretReference) -> Result<()>;
}

/// [`KubeClient`] over the API server, for cluster-scoped kind `K`
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    fn api(&self) -> Api<K> {
        Api::all(self.client.clone())
    }

    /// Current finalizers and the resource version they were read at
    async fn finalizers(&self, name: &str) -> Result<(Option<String>, Vec<String>)> {
        let obj = self.api().get(name).await?;
        let meta = obj.meta();
        Ok((meta.resource_version.clone(), meta.finalizers.clone().unwrap_or_default()))
    }

    async fn set_finalizers(
        &self,
        name: &str,
        resource_version: Option<&str>,
        finalizers: &[String],
    ) -> Result<()> {
        let patch = finalizer_patch(resource_version, finalizers);
        self.api()
            .patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<K> KubeClient for KubeStore<K>
where
    K: Resource<DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    async fn add_finalizer(&self, name: &str) -> Result<()> {
        let (version, mut finalizers) = self.finalizers(name).await?;
        if finalizers.iter().any(|f| f == FINALIZER) {
            return Ok(());
        }
        finalizers.push(FINALIZER.to_string());
        self.set_finalizers(name, version.as_deref(), &finalizers).await
    }

    async fn remove_finalizer(&self, name: &str) -> Result<()> {
        let (version, mut finalizers) = self.finalizers(name).await?;
        let before = finalizers.len();
        finalizers.retain(|f| f != FINALIZER);
        if finalizers.len() == before {
            return Ok(());
        }
        self.set_finalizers(name, version.as_deref(), &finalizers).await
    }

    async fn patch(&self, name: &str, patch: &Value) -> Result<()> {
        self.api()
            .patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn patch_status(&self, name: &str, status: &Value) -> Result<()> {
        self.api()
            .patch_status(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&json!({ "status": status })),
            )
            .await?;
        Ok(())
    }

    async fn apply_secret(&self, secret: &SecretReference, data: &ConnectionDetails) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &secret.namespace);
        let body = connection_secret(secret, data);
        api.patch(
            &secret.name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&body),
        )
        .await?;
        debug!("Published connection secret {}/{}", secret.namespace, secret.name);
        Ok(())
    }

    async fn delete_secret(&self, secret: &SecretReference) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &secret.namespace);
        match api.delete(&secret.name, &Default::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Merge patch replacing the finalizer list. The resource version makes the
/// API server reject it with a conflict if the list changed since it was read.
pub fn finalizer_patch(resource_version: Option<&str>, finalizers: &[String]) -> Value {
    let mut metadata = json!({ "finalizers": finalizers });
    if let Some(version) = resource_version {
        metadata["resourceVersion"] = Value::String(version.to_string());
    }
    json!({ "metadata": metadata })
}

/// Secret carrying connection details
pub fn connection_secret(secret: &SecretReference, data: &ConnectionDetails) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(secret.name.clone()),
            namespace: Some(secret.namespace.clone()),
            ..Default::default()
        },
        type_: Some("connection.cloud.datum.net/v1alpha1".to_string()),
        data: Some(
            data.iter()
                .map(|(key, value)| (key.clone(), ByteString(value.clone())))
                .collect(),
        ),
        ..Default::default()
    }
}
