//! Generic lifecycle of a managed resource
//!
//! One reconciliation resolves references, observes the cloud object,
//! creates it when absent, persists late-initialized desired state,
//! publishes connection details and updates the object when it has drifted.
//! Deletion observes until the cloud object is gone before the finalizer is
//! released.

use futures::StreamExt;
use kube::{Api, Resource, ResourceExt};
use kube_runtime::{controller::Action, watcher, Controller};
use provider_api::common::{
    Condition, ConditionReason, ConditionType, DeletionPolicy, Managed,
};
use provider_core::{ConnectionDetails, ExternalClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{ReconcileError, Result};
use crate::kube_client::{KubeClient, FINALIZER};
use crate::metrics::{Outcome, ReconcileMetrics};

/// Shared state of one kind's controller
pub struct Context<K> {
    pub kube: Arc<dyn KubeClient>,
    pub external: Arc<dyn ExternalClient<K>>,
    pub metrics: Arc<ReconcileMetrics>,
    /// Interval between reconciliations of a healthy resource
    pub requeue: Duration,
    /// Retry interval after a failure, and poll interval while waiting
    pub error_requeue: Duration,
}

/// Watch all objects of kind `K` and reconcile them until the stream ends
pub async fn run<K: Managed>(api: Api<K>, ctx: Context<K>) {
    let kind = K::kind(&()).to_string();
    info!("Starting {} controller", kind);

    let mut stream = Controller::new(api, watcher::Config::default())
        .run(reconcile::<K>, error_policy::<K>, Arc::new(ctx))
        .boxed();

    while let Some(item) = stream.next().await {
        match item {
            Ok((obj, _)) => debug!("Reconciled {} {}", kind, obj.name),
            Err(e) => error!("{} reconcile failed: {}", kind, e),
        }
    }
}

pub async fn reconcile<K: Managed>(obj: Arc<K>, ctx: Arc<Context<K>>) -> Result<Action> {
    let start = Instant::now();
    let result = reconcile_managed::<K>(&obj, &ctx).await;

    let outcome = match &result {
        Ok(_) => Outcome::Success,
        Err(_) => Outcome::Error,
    };
    ctx.metrics.record(&K::kind(&()), outcome, start.elapsed());

    result
}

pub fn error_policy<K: Managed>(obj: Arc<K>, error: &ReconcileError, ctx: Arc<Context<K>>) -> Action {
    warn!(
        kind = %K::kind(&()),
        resource = %obj.name_any(),
        "Reconciliation failed, retrying: {}",
        error
    );
    Action::requeue(ctx.error_requeue)
}

async fn reconcile_managed<K: Managed>(obj: &K, ctx: &Context<K>) -> Result<Action> {
    let name = obj.name_any();
    let mut resource = obj.clone();

    if resource.meta().deletion_timestamp.is_some() {
        if !has_finalizer(&resource) {
            return Ok(Action::await_change());
        }
        let result = finalize(&name, &mut resource, ctx).await;
        if let Err(e) = &result {
            resource.set_condition(Condition::reconcile_error(e.to_string()));
            if let Err(status_error) = publish_status(&name, &resource, ctx).await {
                warn!(resource = %name, "Cannot record deletion failure: {}", status_error);
            }
        }
        return result;
    }

    if !has_finalizer(&resource) {
        ctx.kube.add_finalizer(&name).await?;
    }

    let result = sync(&name, &mut resource, ctx).await;
    if let Err(e) = &result {
        warn!(kind = %K::kind(&()), resource = %name, "Sync failed: {}", e);
        resource.set_condition(Condition::reconcile_error(e.to_string()));
    }

    let status = publish_status(&name, &resource, ctx).await;
    let action = result?;
    status?;
    Ok(action)
}

async fn sync<K: Managed>(name: &str, resource: &mut K, ctx: &Context<K>) -> Result<Action> {
    let resolution = ctx.external.resolve_references(resource).await?;
    if resolution.changed {
        debug!(resource = %name, "Persisting resolved references");
        ctx.kube.patch(name, &desired_state_patch(resource)?).await?;
    }
    if !resolution.pending.is_empty() {
        let message = format!("waiting for {} to be resolved", resolution.pending.join(", "));
        info!(resource = %name, "{}", message);
        resource.set_condition(Condition::reconcile_error(message));
        return Ok(Action::requeue(ctx.error_requeue));
    }

    let observation = ctx.external.observe(resource).await?;

    if !observation.resource_exists {
        info!(kind = %K::kind(&()), resource = %name, "Creating external resource");
        let creation = ctx.external.create(resource).await?;
        ctx.kube.patch(name, &desired_state_patch(resource)?).await?;
        publish_connection_details(resource, &creation.connection_details, ctx).await?;
        resource.set_condition(Condition::reconcile_success());
        // Poll until the new object settles
        return Ok(Action::requeue(ctx.error_requeue));
    }

    if observation.resource_late_initialized {
        debug!(resource = %name, "Persisting late-initialized desired state");
        ctx.kube.patch(name, &desired_state_patch(resource)?).await?;
    }

    publish_connection_details(resource, &observation.connection_details, ctx).await?;

    if !observation.resource_up_to_date {
        info!(kind = %K::kind(&()), resource = %name, "Updating external resource");
        ctx.external.update(resource).await?;
    }

    resource.set_condition(Condition::reconcile_success());
    Ok(Action::requeue(ctx.requeue))
}

async fn finalize<K: Managed>(name: &str, resource: &mut K, ctx: &Context<K>) -> Result<Action> {
    if resource.deletion_policy() == DeletionPolicy::Delete {
        let observation = ctx.external.observe(resource).await?;
        if observation.resource_exists {
            if !is_deleting(resource) {
                info!(kind = %K::kind(&()), resource = %name, "Deleting external resource");
                ctx.external.delete(resource).await?;
            }
            resource.set_condition(Condition::reconcile_success());
            publish_status(name, resource, ctx).await?;
            return Ok(Action::requeue(ctx.error_requeue));
        }
    } else {
        info!(kind = %K::kind(&()), resource = %name, "Orphaning external resource");
    }

    if let Some(secret) = resource.connection_secret_ref() {
        ctx.kube.delete_secret(secret).await?;
    }
    ctx.kube.remove_finalizer(name).await?;
    info!(resource = %name, "Released finalizer");

    Ok(Action::await_change())
}

async fn publish_connection_details<K: Managed>(
    resource: &K,
    details: &ConnectionDetails,
    ctx: &Context<K>,
) -> Result<()> {
    match resource.connection_secret_ref() {
        Some(secret) if !details.is_empty() => ctx.kube.apply_secret(secret, details).await,
        _ => Ok(()),
    }
}

async fn publish_status<K: Managed>(name: &str, resource: &K, ctx: &Context<K>) -> Result<()> {
    match serde_json::to_value(resource)?.get("status") {
        Some(status) if !status.is_null() => ctx.kube.patch_status(name, status).await,
        _ => Ok(()),
    }
}

fn has_finalizer<K: Resource>(resource: &K) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|name| name == FINALIZER))
}

/// The cloud object is already being torn down
fn is_deleting<K: Managed>(resource: &K) -> bool {
    resource.conditions().iter().any(|c| {
        c.condition_type == ConditionType::Ready && c.reason == ConditionReason::Deleting
    })
}

/// Merge patch persisting annotations and desired state
pub fn desired_state_patch<K: Managed>(resource: &K) -> Result<Value> {
    let spec = serde_json::to_value(resource)?
        .get("spec")
        .cloned()
        .unwrap_or_else(|| json!({}));

    Ok(json!({
        "metadata": { "annotations": resource.annotations() },
        "spec": spec,
    }))
}
