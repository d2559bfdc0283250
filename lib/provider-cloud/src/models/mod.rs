//! Request and response bodies of the cloud APIs

pub mod catalog;
pub mod event_streams;
pub mod resource_controller;
pub mod vpc;

pub use catalog::{CatalogEntry, ResourceGroup};
pub use event_streams::{ConfigEntry, TopicConfigs, TopicCreateRequest, TopicDetail};
pub use resource_controller::{
    CreateResourceInstanceRequest, CreateResourceKeyRequest, LastOperation, ResourceInstance,
    ResourceInstanceState, ResourceKey, ResourceKeyState,
};
pub use vpc::{
    Subnet, SubnetPrototype, SubnetPrototypeByCidr, SubnetPrototypeByTotalCount, SubnetState, Vpc,
    VpcPrototype, VpcState, ZoneIdentity, ZoneReference,
};

use serde::{Deserialize, Serialize};

/// Sparse JSON merge-patch body sent to an update endpoint
pub type PatchDocument = serde_json::Map<String, serde_json::Value>;

/// Reference to another object embedded in a response.
///
/// Every field may be empty when the server chose not to populate it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub crn: String,

    #[serde(default)]
    pub href: String,

    #[serde(default)]
    pub name: String,
}

impl ResourceReference {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Identity of another object in a request body.
///
/// The API accepts any one of the fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl ResourceIdentity {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn by_crn(crn: impl Into<String>) -> Self {
        Self {
            crn: Some(crn.into()),
            ..Default::default()
        }
    }

    pub fn by_href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }
}
