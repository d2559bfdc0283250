//! VPC API request and response bodies

use serde::{Deserialize, Serialize};

use super::{ResourceIdentity, ResourceReference};

/// Lifecycle status of a VPC
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpcState {
    Available,
    Deleting,
    Failed,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VpcState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VpcState::Available => "available",
            VpcState::Deleting => "deleting",
            VpcState::Failed => "failed",
            VpcState::Pending => "pending",
            VpcState::Unknown => "unknown",
        }
    }
}

/// Lifecycle status of a subnet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetState {
    Available,
    Deleting,
    Failed,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SubnetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetState::Available => "available",
            SubnetState::Deleting => "deleting",
            SubnetState::Failed => "failed",
            SubnetState::Pending => "pending",
            SubnetState::Unknown => "unknown",
        }
    }
}

/// A VPC as returned by the API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vpc {
    pub id: String,

    #[serde(default)]
    pub crn: String,

    #[serde(default)]
    pub href: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub classic_access: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default)]
    pub status: VpcState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_network_acl: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_routing_table: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_security_group: Option<ResourceReference>,
}

/// Body of a VPC create request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VpcPrototype {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix_management: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classic_access: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceIdentity>,
}

/// Zone of a subnet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneReference {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub href: String,
}

/// Zone named in a create request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneIdentity {
    pub name: String,
}

/// A subnet as returned by the API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,

    #[serde(default)]
    pub crn: String,

    #[serde(default)]
    pub href: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub ip_version: String,

    #[serde(default)]
    pub ipv4_cidr_block: String,

    #[serde(default)]
    pub available_ipv4_address_count: i64,

    #[serde(default)]
    pub total_ipv4_address_count: i64,

    #[serde(default)]
    pub status: SubnetState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_acl: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_gateway: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_table: Option<ResourceReference>,

    #[serde(default)]
    pub vpc: ResourceReference,

    #[serde(default)]
    pub zone: ZoneReference,
}

/// Body of a subnet create request; the API accepts either shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubnetPrototype {
    ByTotalCount(SubnetPrototypeByTotalCount),
    ByCidr(SubnetPrototypeByCidr),
}

/// Subnet create request sized by address count
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetPrototypeByTotalCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acl: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_gateway: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_table: Option<ResourceIdentity>,

    pub vpc: ResourceIdentity,

    pub total_ipv4_address_count: i64,

    pub zone: ZoneIdentity,
}

/// Subnet create request with an explicit block
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubnetPrototypeByCidr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acl: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_gateway: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceIdentity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_table: Option<ResourceIdentity>,

    pub vpc: ResourceIdentity,

    pub ipv4_cidr_block: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneIdentity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_state_unknown_value() {
        let state: SubnetState = serde_json::from_str("\"migrating\"").unwrap();
        assert_eq!(state, SubnetState::Unknown);
    }

    #[test]
    fn test_subnet_without_optional_references() {
        let subnet: Subnet = serde_json::from_value(serde_json::json!({
            "id": "sn-1",
            "name": "sn1",
            "status": "available",
            "vpc": {"id": "vpc-1"},
            "zone": {"name": "us-south-1"}
        }))
        .unwrap();

        assert_eq!(subnet.status, SubnetState::Available);
        assert!(subnet.network_acl.is_none());
        assert_eq!(subnet.zone.name, "us-south-1");
    }
}
