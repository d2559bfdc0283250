//! Cross-resource references and selectors

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to another managed resource by name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reference {
    /// Name of the referenced object
    pub name: String,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Selects exactly one managed resource by its labels
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Labels the selected object must carry
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl Selector {
    /// True when every selector label is present on `labels` with the same value
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

/// Reference to a Kubernetes secret
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecretReference {
    /// Name of the secret
    pub name: String,
    /// Namespace of the secret
    pub namespace: String,
}

/// What happens to the cloud resource when its managed resource is deleted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DeletionPolicy {
    /// Delete the cloud resource
    #[default]
    Delete,
    /// Leave the cloud resource in place
    Orphan,
}
