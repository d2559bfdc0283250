use anyhow::Result;
use clap::Parser;
use kube::{Api, Client};
use provider_api::common::Managed;
use provider_api::v1alpha1::{API_VERSION, EVENT_STREAMS_GROUP, RESOURCE_CONTROLLER_GROUP, VPC_GROUP};
use provider_api::{ResourceInstance, ResourceKey, Subnet, Topic, VPC};
use provider_cloud::{CloudClient, Endpoints, IamAuthenticator};
use provider_core::{
    ExternalClient, ResourceInstanceClient, ResourceKeyClient, SubnetClient, TopicClient,
    VpcClient,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod kube_client;
mod metrics;
mod reconciler;

use config::{Config, LogFormat};
use kube_client::KubeStore;
use metrics::ReconcileMetrics;
use reconciler::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format)?;

    info!("Starting provider-controller in region {}...", config.region);

    let client = Client::try_default().await?;

    let (namespace, name) = config.credentials_secret()?;
    let auth = IamAuthenticator::from_secret(
        client.clone(),
        namespace,
        name,
        &config.credentials_key,
        config.iam_endpoint.clone(),
    )
    .await?;
    let cloud = Arc::new(CloudClient::new(
        Arc::new(auth),
        Endpoints::for_region(&config.region),
    ));

    let metrics = Arc::new(ReconcileMetrics::new()?);

    info!(
        "Watching {}/{}, {}/{} and {}/{} resources",
        VPC_GROUP, API_VERSION, RESOURCE_CONTROLLER_GROUP, API_VERSION, EVENT_STREAMS_GROUP, API_VERSION
    );

    let vpcs: Api<VPC> = Api::all(client.clone());
    let instances: Api<ResourceInstance> = Api::all(client.clone());
    let keys: Api<ResourceKey> = Api::all(client.clone());

    let controllers = vec![
        spawn_controller::<VPC>(
            &client,
            Arc::new(VpcClient::new(cloud.clone())),
            &metrics,
            &config,
        ),
        spawn_controller::<Subnet>(
            &client,
            Arc::new(SubnetClient::new(cloud.clone(), Arc::new(vpcs))),
            &metrics,
            &config,
        ),
        spawn_controller::<ResourceInstance>(
            &client,
            Arc::new(ResourceInstanceClient::new(cloud.clone(), cloud.clone())),
            &metrics,
            &config,
        ),
        spawn_controller::<ResourceKey>(
            &client,
            Arc::new(ResourceKeyClient::new(cloud.clone(), Arc::new(instances))),
            &metrics,
            &config,
        ),
        spawn_controller::<Topic>(
            &client,
            Arc::new(TopicClient::new(cloud.clone(), Arc::new(keys))),
            &metrics,
            &config,
        ),
    ];

    let metrics_addr = config.metrics_addr;
    tokio::spawn(async move {
        if let Err(e) = metrics::serve(metrics_addr, metrics).await {
            error!("Metrics server error: {}", e);
        }
    });

    // Keep the process alive
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting...");

    for controller in controllers {
        controller.abort();
    }

    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("provider_controller=info".parse()?);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}

fn spawn_controller<K: Managed>(
    client: &Client,
    external: Arc<dyn ExternalClient<K>>,
    metrics: &Arc<ReconcileMetrics>,
    config: &Config,
) -> JoinHandle<()> {
    let ctx = Context {
        kube: Arc::new(KubeStore::<K>::new(client.clone())),
        external,
        metrics: metrics.clone(),
        requeue: config.requeue(),
        error_requeue: config.error_requeue(),
    };
    let api: Api<K> = Api::all(client.clone());

    tokio::spawn(reconciler::run(api, ctx))
}
