//! HTTP client for the cloud APIs

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::api::{CatalogApi, EventStreamsAdminApi, ResourceControllerApi, VpcApi};
use crate::auth::IamAuthenticator;
use crate::models::catalog::{CatalogPage, ResourceGroupPage};
use crate::models::{
    CreateResourceInstanceRequest, CreateResourceKeyRequest, PatchDocument, ResourceGroup,
    ResourceInstance, ResourceKey, Subnet, SubnetPrototype, TopicCreateRequest, TopicDetail, Vpc,
    VpcPrototype,
};
use crate::{CloudError, Result};

/// Version date sent with every VPC API request
const VPC_API_VERSION: &str = "2024-04-30";

const MERGE_PATCH: &str = "application/merge-patch+json";

/// Base URLs of the APIs the provider talks to
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub vpc: String,
    pub resource_controller: String,
    pub resource_manager: String,
    pub global_catalog: String,
    pub tagging: String,
}

impl Endpoints {
    /// Public endpoints for a region, e.g. "us-south"
    pub fn for_region(region: &str) -> Self {
        Self {
            vpc: format!("https://{}.iaas.cloud.ibm.com/v1", region),
            resource_controller: "https://resource-controller.cloud.ibm.com".to_string(),
            resource_manager: "https://resource-controller.cloud.ibm.com".to_string(),
            global_catalog: "https://globalcatalog.cloud.ibm.com/api/v1".to_string(),
            tagging: "https://tags.global-search-tagging.cloud.ibm.com".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TagPage {
    #[serde(default)]
    items: Vec<TagItem>,
}

#[derive(Deserialize)]
struct TagItem {
    name: String,
}

/// CloudClient implements every cloud API trait over HTTPS
#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    auth: Arc<IamAuthenticator>,
    endpoints: Endpoints,
}

impl CloudClient {
    /// Create a new cloud client
    pub fn new(auth: Arc<IamAuthenticator>, endpoints: Endpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            endpoints,
        }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    fn vpc_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, format!("{}{}", self.endpoints.vpc, path))
            .query(&[("version", VPC_API_VERSION), ("generation", "2")])
    }

    /// Authenticate and send, mapping 404 and other failures to errors
    async fn execute(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let token = self.auth.token().await?;
        let response = builder.bearer_auth(token).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CloudError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CloudError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = self.execute(builder, what).await?;
        Ok(response.json().await?)
    }

    fn merge_patch(builder: RequestBuilder, patch: &PatchDocument) -> Result<RequestBuilder> {
        Ok(builder
            .header(header::CONTENT_TYPE, MERGE_PATCH)
            .body(serde_json::to_vec(patch)?))
    }

    async fn list_tags(&self, crn: &str) -> Result<Vec<String>> {
        let builder = self
            .request(Method::GET, format!("{}/v3/tags", self.endpoints.tagging))
            .query(&[("attached_to", crn), ("tag_type", "user")]);
        let page: TagPage = self.fetch(builder, crn).await?;
        Ok(page.items.into_iter().map(|tag| tag.name).collect())
    }

    async fn change_tags(&self, action: &str, crn: &str, tags: &[String]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let body = serde_json::json!({
            "resources": [{"resource_id": crn}],
            "tag_names": tags,
        });
        let builder = self
            .request(Method::POST, format!("{}/v3/tags/{}", self.endpoints.tagging, action))
            .json(&body);
        self.execute(builder, crn).await?;
        Ok(())
    }

    async fn service_plans(&self, service_name: &str) -> Result<Vec<crate::models::CatalogEntry>> {
        let builder = self
            .request(Method::GET, self.endpoints.global_catalog.clone())
            .query(&[("q", format!("name:{}", service_name)), ("complete", "false".to_string())]);
        let services: CatalogPage = self.fetch(builder, service_name).await?;
        let service = services
            .resources
            .into_iter()
            .find(|entry| entry.name == service_name)
            .ok_or_else(|| CloudError::NotFound(format!("catalog service {}", service_name)))?;

        let builder = self.request(
            Method::GET,
            format!("{}/{}/plan", self.endpoints.global_catalog, service.id),
        );
        let plans: CatalogPage = self.fetch(builder, service_name).await?;
        Ok(plans.resources)
    }
}

#[async_trait]
impl VpcApi for CloudClient {
    async fn get_vpc(&self, id: &str) -> Result<Vpc> {
        self.fetch(self.vpc_request(Method::GET, &format!("/vpcs/{}", id)), id)
            .await
    }

    async fn create_vpc(&self, prototype: &VpcPrototype) -> Result<Vpc> {
        let builder = self.vpc_request(Method::POST, "/vpcs").json(prototype);
        self.fetch(builder, "vpc").await
    }

    async fn update_vpc(&self, id: &str, patch: &PatchDocument) -> Result<Vpc> {
        let builder = Self::merge_patch(self.vpc_request(Method::PATCH, &format!("/vpcs/{}", id)), patch)?;
        self.fetch(builder, id).await
    }

    async fn delete_vpc(&self, id: &str) -> Result<()> {
        self.execute(self.vpc_request(Method::DELETE, &format!("/vpcs/{}", id)), id)
            .await?;
        Ok(())
    }

    async fn get_subnet(&self, id: &str) -> Result<Subnet> {
        self.fetch(self.vpc_request(Method::GET, &format!("/subnets/{}", id)), id)
            .await
    }

    async fn create_subnet(&self, prototype: &SubnetPrototype) -> Result<Subnet> {
        let builder = self.vpc_request(Method::POST, "/subnets").json(prototype);
        self.fetch(builder, "subnet").await
    }

    async fn update_subnet(&self, id: &str, patch: &PatchDocument) -> Result<Subnet> {
        let builder =
            Self::merge_patch(self.vpc_request(Method::PATCH, &format!("/subnets/{}", id)), patch)?;
        self.fetch(builder, id).await
    }

    async fn delete_subnet(&self, id: &str) -> Result<()> {
        self.execute(self.vpc_request(Method::DELETE, &format!("/subnets/{}", id)), id)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceControllerApi for CloudClient {
    async fn get_resource_instance(&self, id: &str) -> Result<ResourceInstance> {
        let url = format!("{}/v2/resource_instances/{}", self.endpoints.resource_controller, id);
        let mut instance: ResourceInstance = self.fetch(self.request(Method::GET, url), id).await?;
        instance.tags = self.list_tags(&instance.crn).await?;
        Ok(instance)
    }

    async fn create_resource_instance(
        &self,
        request: &CreateResourceInstanceRequest,
    ) -> Result<ResourceInstance> {
        let url = format!("{}/v2/resource_instances", self.endpoints.resource_controller);
        self.fetch(self.request(Method::POST, url).json(request), &request.name)
            .await
    }

    async fn update_resource_instance(
        &self,
        id: &str,
        patch: &PatchDocument,
    ) -> Result<ResourceInstance> {
        let url = format!("{}/v2/resource_instances/{}", self.endpoints.resource_controller, id);
        self.fetch(self.request(Method::PATCH, url).json(patch), id)
            .await
    }

    async fn delete_resource_instance(&self, id: &str, recursive: bool) -> Result<()> {
        let url = format!("{}/v2/resource_instances/{}", self.endpoints.resource_controller, id);
        let builder = self
            .request(Method::DELETE, url)
            .query(&[("recursive", recursive)]);
        self.execute(builder, id).await?;
        Ok(())
    }

    async fn attach_tags(&self, crn: &str, tags: &[String]) -> Result<()> {
        self.change_tags("attach", crn, tags).await
    }

    async fn detach_tags(&self, crn: &str, tags: &[String]) -> Result<()> {
        self.change_tags("detach", crn, tags).await
    }

    async fn get_resource_key(&self, id: &str) -> Result<ResourceKey> {
        let url = format!("{}/v2/resource_keys/{}", self.endpoints.resource_controller, id);
        self.fetch(self.request(Method::GET, url), id).await
    }

    async fn create_resource_key(&self, request: &CreateResourceKeyRequest) -> Result<ResourceKey> {
        let url = format!("{}/v2/resource_keys", self.endpoints.resource_controller);
        self.fetch(self.request(Method::POST, url).json(request), &request.name)
            .await
    }

    async fn update_resource_key(&self, id: &str, patch: &PatchDocument) -> Result<ResourceKey> {
        let url = format!("{}/v2/resource_keys/{}", self.endpoints.resource_controller, id);
        self.fetch(self.request(Method::PATCH, url).json(patch), id)
            .await
    }

    async fn delete_resource_key(&self, id: &str) -> Result<()> {
        let url = format!("{}/v2/resource_keys/{}", self.endpoints.resource_controller, id);
        self.execute(self.request(Method::DELETE, url), id).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for CloudClient {
    async fn resource_plan_id(&self, service_name: &str, plan_name: &str) -> Result<String> {
        self.service_plans(service_name)
            .await?
            .into_iter()
            .find(|plan| plan.name == plan_name)
            .map(|plan| plan.id)
            .ok_or_else(|| CloudError::NotFound(format!("plan {} of {}", plan_name, service_name)))
    }

    async fn resource_plan_name(&self, service_name: &str, plan_id: &str) -> Result<String> {
        self.service_plans(service_name)
            .await?
            .into_iter()
            .find(|plan| plan.id == plan_id)
            .map(|plan| plan.name)
            .ok_or_else(|| CloudError::NotFound(format!("plan {} of {}", plan_id, service_name)))
    }

    async fn resource_group_id(&self, name: &str) -> Result<String> {
        let url = format!("{}/v2/resource_groups", self.endpoints.resource_manager);
        let page: ResourceGroupPage = self
            .fetch(self.request(Method::GET, url).query(&[("name", name)]), name)
            .await?;
        page.resources
            .into_iter()
            .find(|group| group.name == name)
            .map(|group| group.id)
            .ok_or_else(|| CloudError::NotFound(format!("resource group {}", name)))
    }

    async fn resource_group_name(&self, id: &str) -> Result<String> {
        let url = format!("{}/v2/resource_groups/{}", self.endpoints.resource_manager, id);
        let group: ResourceGroup = self.fetch(self.request(Method::GET, url), id).await?;
        Ok(group.name)
    }
}

#[async_trait]
impl EventStreamsAdminApi for CloudClient {
    async fn get_topic(&self, admin_url: &str, name: &str) -> Result<TopicDetail> {
        let url = format!("{}/admin/topics/{}", admin_url.trim_end_matches('/'), name);
        self.fetch(self.request(Method::GET, url), name).await
    }

    async fn create_topic(&self, admin_url: &str, request: &TopicCreateRequest) -> Result<()> {
        let url = format!("{}/admin/topics", admin_url.trim_end_matches('/'));
        self.execute(self.request(Method::POST, url).json(request), &request.name)
            .await?;
        Ok(())
    }

    async fn update_topic(&self, admin_url: &str, name: &str, patch: &PatchDocument) -> Result<()> {
        let url = format!("{}/admin/topics/{}", admin_url.trim_end_matches('/'), name);
        self.execute(self.request(Method::PATCH, url).json(patch), name)
            .await?;
        Ok(())
    }

    async fn delete_topic(&self, admin_url: &str, name: &str) -> Result<()> {
        let url = format!("{}/admin/topics/{}", admin_url.trim_end_matches('/'), name);
        self.execute(self.request(Method::DELETE, url), name).await?;
        Ok(())
    }
}
