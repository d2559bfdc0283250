use provider_cloud::CloudError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous reference: selector for {field} matched {count} resources")]
    AmbiguousReference { field: &'static str, count: usize },

    #[error("Cannot resolve {field}: {source}")]
    ResolutionFailed {
        field: &'static str,
        source: Box<CoreError>,
    },

    #[error("{context}: {source}")]
    Lookup {
        context: &'static str,
        source: CloudError,
    },

    #[error("{context}: {source}")]
    Cloud {
        context: &'static str,
        source: CloudError,
    },

    #[error("Cannot render connection detail {key}: {source}")]
    Template {
        key: String,
        source: minijinja::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CoreError {
    /// Wrap a failed cloud call with the operation it belonged to
    pub fn cloud(context: &'static str) -> impl FnOnce(CloudError) -> CoreError {
        move |source| CoreError::Cloud { context, source }
    }

    /// Wrap a failed secondary lookup with the field it was resolving
    pub fn lookup(context: &'static str) -> impl FnOnce(CloudError) -> CoreError {
        move |source| CoreError::Lookup { context, source }
    }

    /// True when the failure means the target object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::NotFound(_) => true,
            CoreError::Cloud { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
