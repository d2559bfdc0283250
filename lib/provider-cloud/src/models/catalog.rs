//! Global catalog and resource manager bodies

use serde::{Deserialize, Serialize};

/// Catalog entry for a service or plan
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub kind: String,
}

/// Page of catalog entries
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CatalogPage {
    #[serde(default)]
    pub resources: Vec<CatalogEntry>,
}

/// Resource group
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,

    #[serde(default)]
    pub name: String,
}

/// Page of resource groups
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ResourceGroupPage {
    #[serde(default)]
    pub resources: Vec<ResourceGroup>,
}
