use provider_core::CoreError;
use thiserror::Error;

/// Failure of one reconciliation
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Engine(#[from] CoreError),

    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
