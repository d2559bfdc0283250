//! Typed operations of each cloud API
//!
//! The reconciliation engine only talks to these traits. [`crate::CloudClient`]
//! implements them over HTTP; tests use the generated mocks.

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

use crate::models::{
    CreateResourceInstanceRequest, CreateResourceKeyRequest, PatchDocument, ResourceInstance,
    ResourceKey, Subnet, SubnetPrototype, TopicCreateRequest, TopicDetail, Vpc, VpcPrototype,
};
use crate::Result;

/// VPC infrastructure API
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait VpcApi: Send + Sync {
    async fn get_vpc(&self, id: &str) -> Result<Vpc>;

    async fn create_vpc(&self, prototype: &VpcPrototype) -> Result<Vpc>;

    async fn update_vpc(&self, id: &str, patch: &PatchDocument) -> Result<Vpc>;

    async fn delete_vpc(&self, id: &str) -> Result<()>;

    async fn get_subnet(&self, id: &str) -> Result<Subnet>;

    async fn create_subnet(&self, prototype: &SubnetPrototype) -> Result<Subnet>;

    async fn update_subnet(&self, id: &str, patch: &PatchDocument) -> Result<Subnet>;

    async fn delete_subnet(&self, id: &str) -> Result<()>;
}

/// Resource controller API: service instances, their keys and tags
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait ResourceControllerApi: Send + Sync {
    /// Fetch an instance, including its attached tags
    async fn get_resource_instance(&self, id: &str) -> Result<ResourceInstance>;

    async fn create_resource_instance(
        &self,
        request: &CreateResourceInstanceRequest,
    ) -> Result<ResourceInstance>;

    async fn update_resource_instance(
        &self,
        id: &str,
        patch: &PatchDocument,
    ) -> Result<ResourceInstance>;

    /// Delete an instance; `recursive` also deletes its keys
    async fn delete_resource_instance(&self, id: &str, recursive: bool) -> Result<()>;

    async fn attach_tags(&self, crn: &str, tags: &[String]) -> Result<()>;

    async fn detach_tags(&self, crn: &str, tags: &[String]) -> Result<()>;

    async fn get_resource_key(&self, id: &str) -> Result<ResourceKey>;

    async fn create_resource_key(&self, request: &CreateResourceKeyRequest) -> Result<ResourceKey>;

    async fn update_resource_key(&self, id: &str, patch: &PatchDocument) -> Result<ResourceKey>;

    async fn delete_resource_key(&self, id: &str) -> Result<()>;
}

/// Secondary lookups between ids and human-readable names
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn resource_plan_id(&self, service_name: &str, plan_name: &str) -> Result<String>;

    async fn resource_plan_name(&self, service_name: &str, plan_id: &str) -> Result<String>;

    async fn resource_group_id(&self, name: &str) -> Result<String>;

    async fn resource_group_name(&self, id: &str) -> Result<String>;
}

/// Event Streams admin API, addressed per instance by its admin URL
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait EventStreamsAdminApi: Send + Sync {
    async fn get_topic(&self, admin_url: &str, name: &str) -> Result<TopicDetail>;

    async fn create_topic(&self, admin_url: &str, request: &TopicCreateRequest) -> Result<()>;

    async fn update_topic(&self, admin_url: &str, name: &str, patch: &PatchDocument) -> Result<()>;

    async fn delete_topic(&self, admin_url: &str, name: &str) -> Result<()>;
}
