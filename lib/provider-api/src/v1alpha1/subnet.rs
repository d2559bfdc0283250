use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{
    impl_managed, Condition, DeletionPolicy, Identity, Reference, SecretReference, Selector,
};

/// Subnet - a range of addresses inside a VPC zone
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vpc.cloud.datum.net",
    version = "v1alpha1",
    kind = "Subnet",
    plural = "subnets",
    status = "SubnetStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"CIDR","type":"string","jsonPath":".status.atProvider.ipv4CidrBlock"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    /// Desired state of the subnet
    pub for_provider: SubnetParameters,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

/// Desired state of a subnet: created either from an address count or from
/// an explicit CIDR block, never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SubnetParameters {
    /// Let the cloud pick a block of the requested size
    ByTotalCount(SubnetByTotalCount),
    /// Use an explicit IPv4 CIDR block
    ByCidr(SubnetByCidr),
}

/// Which creation strategy a subnet uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubnetBranch {
    ByTotalCount,
    ByCidr,
}

impl SubnetParameters {
    pub fn branch(&self) -> SubnetBranch {
        match self {
            SubnetParameters::ByTotalCount(_) => SubnetBranch::ByTotalCount,
            SubnetParameters::ByCidr(_) => SubnetBranch::ByCidr,
        }
    }

    /// Fields shared by both strategies
    pub fn common(&self) -> &SubnetCommon {
        match self {
            SubnetParameters::ByTotalCount(p) => &p.common,
            SubnetParameters::ByCidr(p) => &p.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut SubnetCommon {
        match self {
            SubnetParameters::ByTotalCount(p) => &mut p.common,
            SubnetParameters::ByCidr(p) => &mut p.common,
        }
    }
}

/// Parameters present regardless of the creation strategy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetCommon {
    /// Unique user-defined name (generated by the cloud if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// IP version, "ipv4". Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,

    /// Network ACL attached to the subnet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acl: Option<Identity>,

    /// Public gateway attached to the subnet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_gateway: Option<Identity>,

    /// Resource group owning the subnet. Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<Identity>,

    /// Routing table attached to the subnet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_table: Option<Identity>,

    /// VPC the subnet belongs to. Immutable after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Identity>,

    /// Reference to a VPC resource whose external name fills `vpc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_ref: Option<Reference>,

    /// Selects a VPC resource whose external name fills `vpc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_selector: Option<Selector>,
}

/// Subnet sized by address count
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetByTotalCount {
    #[serde(flatten)]
    pub common: SubnetCommon,

    /// Total number of IPv4 addresses, a power of two. Immutable.
    #[serde(default)]
    pub total_ipv4_address_count: i64,

    /// Zone name. Immutable.
    #[serde(default)]
    pub zone: String,
}

/// Subnet with an explicit block
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetByCidr {
    #[serde(flatten)]
    pub common: SubnetCommon,

    /// IPv4 range in CIDR notation. Immutable.
    pub ipv4_cidr_block: String,

    /// Zone name; derived from the address prefix when unset. Immutable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Observed state of a subnet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetObservation {
    pub id: String,

    pub crn: String,

    pub href: String,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    pub ipv4_cidr_block: String,

    pub available_ipv4_address_count: i64,

    pub total_ipv4_address_count: i64,

    pub zone: String,

    pub vpc: String,
}

/// Status of a subnet
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<SubnetObservation>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Subnet);
