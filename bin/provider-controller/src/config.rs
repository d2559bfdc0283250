//! Command-line and environment configuration

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use provider_cloud::auth::DEFAULT_IAM_ENDPOINT;
use std::net::SocketAddr;
use std::time::Duration;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "provider-controller")]
#[command(about = "Reconciles VPC, Subnet, ResourceInstance, ResourceKey and Topic resources against the cloud")]
pub struct Config {
    /// Cloud region the regional APIs are addressed in
    #[arg(long, env = "CLOUD_REGION", default_value = "us-south")]
    pub region: String,

    /// Secret holding the API key, as namespace/name
    #[arg(long, env = "CLOUD_CREDENTIALS_SECRET", default_value = "crossplane-system/cloud-credentials")]
    pub credentials_secret: String,

    /// Key of the API key within the credentials secret
    #[arg(long, env = "CLOUD_CREDENTIALS_KEY", default_value = "apikey")]
    pub credentials_key: String,

    /// IAM token endpoint
    #[arg(long, env = "IAM_ENDPOINT", default_value = DEFAULT_IAM_ENDPOINT)]
    pub iam_endpoint: String,

    /// Seconds between reconciliations of a healthy resource
    #[arg(long, env = "REQUEUE_SECONDS", default_value_t = 300)]
    pub requeue_seconds: u64,

    /// Seconds before retrying a failed reconciliation
    #[arg(long, env = "ERROR_REQUEUE_SECONDS", default_value_t = 30)]
    pub error_requeue_seconds: u64,

    /// Listen address for /metrics and /healthz
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:8080")]
    pub metrics_addr: SocketAddr,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    /// Namespace and name of the credentials secret
    pub fn credentials_secret(&self) -> Result<(&str, &str)> {
        self.credentials_secret
            .split_once('/')
            .filter(|(namespace, name)| !namespace.is_empty() && !name.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "credentials secret must be namespace/name, got {}",
                    self.credentials_secret
                )
            })
    }

    pub fn requeue(&self) -> Duration {
        Duration::from_secs(self.requeue_seconds)
    }

    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_seconds)
    }
}
