//! Mapping between subnet desired state and the VPC API
//!
//! Only the creation strategy chosen in the desired state is ever read or
//! written; the other strategy's fields never take part.

use ipnetwork::Ipv4Network;
use provider_api::common::Identity;
use provider_api::v1alpha1::subnet::{SubnetByCidr, SubnetByTotalCount, SubnetCommon, SubnetObservation};
use provider_api::v1alpha1::{SubnetBranch, SubnetParameters};
use provider_cloud::models::{
    PatchDocument, ResourceIdentity, Subnet, SubnetPrototype, SubnetPrototypeByCidr,
    SubnetPrototypeByTotalCount, ZoneIdentity,
};
use serde_json::{json, Value};

use crate::fields::{
    canonical_id, identities_equal, identity_from_reference, identity_to_request,
    late_init_identity, late_init_required, late_init_string, non_empty, unset_or_equal,
};
use crate::{CoreError, Result};

/// Fields of a subnet that can change after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubnetField {
    Name,
    NetworkAcl,
    PublicGateway,
    RoutingTable,
}

impl SubnetField {
    /// Key of the field in an update request
    pub fn wire_name(&self) -> &'static str {
        match self {
            SubnetField::Name => "name",
            SubnetField::NetworkAcl => "network_acl",
            SubnetField::PublicGateway => "public_gateway",
            SubnetField::RoutingTable => "routing_table",
        }
    }
}

fn request_identity(identity: &Option<Identity>) -> Option<ResourceIdentity> {
    identity
        .as_ref()
        .filter(|identity| !identity.is_empty())
        .map(identity_to_request)
}

/// Create request for the desired state
pub fn generate_prototype(params: &SubnetParameters) -> Result<SubnetPrototype> {
    let common = params.common();
    let vpc = request_identity(&common.vpc).ok_or_else(|| {
        CoreError::InvalidConfiguration(
            "subnet has no VPC; set vpc, vpcRef or vpcSelector".to_string(),
        )
    })?;

    let name = common.name.clone().filter(|name| !name.is_empty());
    let ip_version = common.ip_version.clone().filter(|version| !version.is_empty());
    let network_acl = request_identity(&common.network_acl);
    let public_gateway = request_identity(&common.public_gateway);
    let resource_group = request_identity(&common.resource_group);
    let routing_table = request_identity(&common.routing_table);

    match params {
        SubnetParameters::ByTotalCount(p) => {
            let count = p.total_ipv4_address_count;
            if count <= 0 || count & (count - 1) != 0 {
                return Err(CoreError::InvalidConfiguration(format!(
                    "totalIpv4AddressCount must be a power of two, got {}",
                    count
                )));
            }
            if p.zone.is_empty() {
                return Err(CoreError::InvalidConfiguration(
                    "zone is required when sizing a subnet by address count".to_string(),
                ));
            }

            Ok(SubnetPrototype::ByTotalCount(SubnetPrototypeByTotalCount {
                name,
                ip_version,
                network_acl,
                public_gateway,
                resource_group,
                routing_table,
                vpc,
                total_ipv4_address_count: count,
                zone: ZoneIdentity { name: p.zone.clone() },
            }))
        }
        SubnetParameters::ByCidr(p) => {
            p.ipv4_cidr_block.parse::<Ipv4Network>().map_err(|e| {
                CoreError::InvalidConfiguration(format!(
                    "invalid ipv4CidrBlock {}: {}",
                    p.ipv4_cidr_block, e
                ))
            })?;

            Ok(SubnetPrototype::ByCidr(SubnetPrototypeByCidr {
                name,
                ip_version,
                network_acl,
                public_gateway,
                resource_group,
                routing_table,
                vpc,
                ipv4_cidr_block: p.ipv4_cidr_block.clone(),
                zone: p
                    .zone
                    .clone()
                    .filter(|zone| !zone.is_empty())
                    .map(|name| ZoneIdentity { name }),
            }))
        }
    }
}

pub fn generate_observation(subnet: &Subnet) -> SubnetObservation {
    SubnetObservation {
        id: subnet.id.clone(),
        crn: subnet.crn.clone(),
        href: subnet.href.clone(),
        status: subnet.status.as_str().to_string(),
        created_at: subnet.created_at.clone(),
        ipv4_cidr_block: subnet.ipv4_cidr_block.clone(),
        available_ipv4_address_count: subnet.available_ipv4_address_count,
        total_ipv4_address_count: subnet.total_ipv4_address_count,
        zone: subnet.zone.name.clone(),
        vpc: subnet.vpc.id.clone(),
    }
}

/// Desired state, in the given strategy, that would produce the observed subnet
pub fn generate_parameters(subnet: &Subnet, branch: SubnetBranch) -> SubnetParameters {
    let common = SubnetCommon {
        name: non_empty(&subnet.name),
        ip_version: non_empty(&subnet.ip_version),
        network_acl: subnet.network_acl.as_ref().map(identity_from_reference),
        public_gateway: subnet.public_gateway.as_ref().map(identity_from_reference),
        resource_group: subnet.resource_group.as_ref().map(identity_from_reference),
        routing_table: subnet.routing_table.as_ref().map(identity_from_reference),
        vpc: non_empty(&subnet.vpc.id).map(Identity::Id),
        vpc_ref: None,
        vpc_selector: None,
    };

    match branch {
        SubnetBranch::ByTotalCount => SubnetParameters::ByTotalCount(SubnetByTotalCount {
            common,
            total_ipv4_address_count: subnet.total_ipv4_address_count,
            zone: subnet.zone.name.clone(),
        }),
        SubnetBranch::ByCidr => SubnetParameters::ByCidr(SubnetByCidr {
            common,
            ipv4_cidr_block: subnet.ipv4_cidr_block.clone(),
            zone: non_empty(&subnet.zone.name),
        }),
    }
}

/// Fill unset desired fields of the active strategy from the observed subnet
pub fn late_initialize(params: &mut SubnetParameters, subnet: &Subnet) -> bool {
    let common = params.common_mut();
    let vpc = non_empty(&subnet.vpc.id).map(|_| &subnet.vpc);

    let mut changed = late_init_string(&mut common.name, &subnet.name);
    changed |= late_init_string(&mut common.ip_version, &subnet.ip_version);
    changed |= late_init_identity(&mut common.network_acl, subnet.network_acl.as_ref());
    changed |= late_init_identity(&mut common.public_gateway, subnet.public_gateway.as_ref());
    changed |= late_init_identity(&mut common.resource_group, subnet.resource_group.as_ref());
    changed |= late_init_identity(&mut common.routing_table, subnet.routing_table.as_ref());
    changed |= late_init_identity(&mut common.vpc, vpc);

    match params {
        SubnetParameters::ByTotalCount(p) => {
            if p.total_ipv4_address_count == 0 && subnet.total_ipv4_address_count > 0 {
                p.total_ipv4_address_count = subnet.total_ipv4_address_count;
                changed = true;
            }
            changed |= late_init_required(&mut p.zone, &subnet.zone.name);
        }
        SubnetParameters::ByCidr(p) => {
            changed |= late_init_required(&mut p.ipv4_cidr_block, &subnet.ipv4_cidr_block);
            changed |= late_init_string(&mut p.zone, &subnet.zone.name);
        }
    }

    changed
}

/// Mutable fields where desired and observed disagree
pub fn changed_fields(desired: &SubnetParameters, subnet: &Subnet) -> Vec<SubnetField> {
    let actual = generate_parameters(subnet, desired.branch());
    let (desired, actual) = (desired.common(), actual.common());
    let mut fields = Vec::new();

    if !unset_or_equal(desired.name.as_deref(), actual.name.as_deref()) {
        fields.push(SubnetField::Name);
    }
    if !identities_equal(desired.network_acl.as_ref(), actual.network_acl.as_ref()) {
        fields.push(SubnetField::NetworkAcl);
    }
    if !identities_equal(desired.public_gateway.as_ref(), actual.public_gateway.as_ref()) {
        fields.push(SubnetField::PublicGateway);
    }
    if !identities_equal(desired.routing_table.as_ref(), actual.routing_table.as_ref()) {
        fields.push(SubnetField::RoutingTable);
    }
    fields
}

/// Immutable fields that no longer match; reported, never patched
pub fn drifted_immutable_fields(desired: &SubnetParameters, subnet: &Subnet) -> Vec<&'static str> {
    let actual = generate_parameters(subnet, desired.branch());
    let mut drifted = Vec::new();

    let (common, observed) = (desired.common(), actual.common());
    if !unset_or_equal(common.ip_version.as_deref(), observed.ip_version.as_deref()) {
        drifted.push("ipVersion");
    }
    if common.resource_group.is_some()
        && !identities_equal(common.resource_group.as_ref(), observed.resource_group.as_ref())
    {
        drifted.push("resourceGroup");
    }
    if common.vpc.is_some() && !identities_equal(common.vpc.as_ref(), observed.vpc.as_ref()) {
        drifted.push("vpc");
    }

    match (desired, &actual) {
        (SubnetParameters::ByTotalCount(d), SubnetParameters::ByTotalCount(a)) => {
            if d.total_ipv4_address_count != 0
                && d.total_ipv4_address_count != a.total_ipv4_address_count
            {
                drifted.push("totalIpv4AddressCount");
            }
            if !unset_or_equal(Some(d.zone.as_str()), Some(a.zone.as_str())) {
                drifted.push("zone");
            }
        }
        (SubnetParameters::ByCidr(d), SubnetParameters::ByCidr(a)) => {
            if !unset_or_equal(Some(d.ipv4_cidr_block.as_str()), Some(a.ipv4_cidr_block.as_str())) {
                drifted.push("ipv4CidrBlock");
            }
            if !unset_or_equal(d.zone.as_deref(), a.zone.as_deref()) {
                drifted.push("zone");
            }
        }
        _ => {}
    }
    drifted
}

pub fn is_up_to_date(desired: &SubnetParameters, subnet: &Subnet) -> bool {
    changed_fields(desired, subnet).is_empty()
}

/// An identity in update form: `{"id": ...}`, or `{}` to detach
fn identity_patch(identity: Option<&Identity>) -> Value {
    match canonical_id(identity) {
        Some(id) => json!({ "id": id }),
        None => json!({}),
    }
}

/// Sparse update carrying only the mutable fields that differ
pub fn build_patch(desired: &SubnetParameters, subnet: &Subnet) -> PatchDocument {
    let common = desired.common();
    let mut patch = PatchDocument::new();

    for field in changed_fields(desired, subnet) {
        let value = match field {
            SubnetField::Name => match &common.name {
                Some(name) => Value::String(name.clone()),
                None => continue,
            },
            SubnetField::NetworkAcl => identity_patch(common.network_acl.as_ref()),
            SubnetField::PublicGateway => identity_patch(common.public_gateway.as_ref()),
            SubnetField::RoutingTable => identity_patch(common.routing_table.as_ref()),
        };
        patch.insert(field.wire_name().to_string(), value);
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_cloud::models::{ResourceReference, SubnetState, ZoneReference};

    fn observed() -> Subnet {
        Subnet {
            id: "sn-1".to_string(),
            name: "sn1".to_string(),
            ip_version: "ipv4".to_string(),
            ipv4_cidr_block: "10.240.0.0/24".to_string(),
            available_ipv4_address_count: 251,
            total_ipv4_address_count: 256,
            status: SubnetState::Available,
            network_acl: Some(ResourceReference::by_id("acl1")),
            resource_group: Some(ResourceReference::by_id("rg1")),
            routing_table: Some(ResourceReference::by_id("rt1")),
            vpc: ResourceReference::by_id("vpc1"),
            zone: ZoneReference {
                name: "us-south-1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn by_count(common: SubnetCommon) -> SubnetParameters {
        SubnetParameters::ByTotalCount(SubnetByTotalCount {
            common,
            total_ipv4_address_count: 256,
            zone: "us-south-1".to_string(),
        })
    }

    fn by_cidr(common: SubnetCommon) -> SubnetParameters {
        SubnetParameters::ByCidr(SubnetByCidr {
            common,
            ipv4_cidr_block: "10.240.0.0/24".to_string(),
            zone: None,
        })
    }

    fn fully_specified() -> SubnetCommon {
        SubnetCommon {
            name: Some("sn1".to_string()),
            ip_version: Some("ipv4".to_string()),
            network_acl: Some(Identity::id("acl1")),
            resource_group: Some(Identity::id("rg1")),
            routing_table: Some(Identity::id("rt1")),
            vpc: Some(Identity::id("vpc1")),
            ..Default::default()
        }
    }

    #[test]
    fn test_prototype_by_total_count() {
        let params = by_count(SubnetCommon {
            name: Some("sn1".to_string()),
            vpc: Some(Identity::id("vpc1")),
            ..Default::default()
        });

        let prototype = generate_prototype(&params).unwrap();

        assert_eq!(
            serde_json::to_value(&prototype).unwrap(),
            json!({
                "name": "sn1",
                "vpc": {"id": "vpc1"},
                "total_ipv4_address_count": 256,
                "zone": {"name": "us-south-1"}
            })
        );
    }

    #[test]
    fn test_prototype_by_cidr_keeps_identity_form() {
        let params = by_cidr(SubnetCommon {
            vpc: Some(Identity::Crn("crn:v1:vpc1".to_string())),
            network_acl: Some(Identity::id("")),
            ..Default::default()
        });

        let prototype = generate_prototype(&params).unwrap();

        assert_eq!(
            serde_json::to_value(&prototype).unwrap(),
            json!({
                "vpc": {"crn": "crn:v1:vpc1"},
                "ipv4_cidr_block": "10.240.0.0/24"
            })
        );
    }

    #[test]
    fn test_prototype_requires_vpc() {
        let err = generate_prototype(&by_count(SubnetCommon::default())).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_prototype_rejects_bad_sizes() {
        let mut params = by_count(fully_specified());
        if let SubnetParameters::ByTotalCount(p) = &mut params {
            p.total_ipv4_address_count = 100;
        }
        assert!(generate_prototype(&params).is_err());

        let mut params = by_cidr(fully_specified());
        if let SubnetParameters::ByCidr(p) = &mut params {
            p.ipv4_cidr_block = "10.240.0.0/33".to_string();
        }
        assert!(generate_prototype(&params).is_err());
    }

    #[test]
    fn test_late_initialize_fills_only_missing_fields() {
        let mut params = by_count(SubnetCommon {
            name: Some("sn1".to_string()),
            vpc: Some(Identity::id("vpc1")),
            ..Default::default()
        });

        assert!(late_initialize(&mut params, &observed()));

        let common = params.common();
        assert_eq!(common.name.as_deref(), Some("sn1"));
        assert_eq!(common.ip_version.as_deref(), Some("ipv4"));
        assert_eq!(common.network_acl, Some(Identity::id("acl1")));
        assert_eq!(common.resource_group, Some(Identity::id("rg1")));
        assert_eq!(common.routing_table, Some(Identity::id("rt1")));
        assert_eq!(common.public_gateway, None);
        assert_eq!(common.vpc, Some(Identity::id("vpc1")));
    }

    #[test]
    fn test_late_initialize_keeps_user_values() {
        let mut common = fully_specified();
        common.name = Some("custom".to_string());
        let mut params = SubnetParameters::ByTotalCount(SubnetByTotalCount {
            common,
            total_ipv4_address_count: 512,
            zone: "us-south-2".to_string(),
        });

        assert!(!late_initialize(&mut params, &observed()));

        assert_eq!(params.common().name.as_deref(), Some("custom"));
        match &params {
            SubnetParameters::ByTotalCount(p) => {
                assert_eq!(p.total_ipv4_address_count, 512);
                assert_eq!(p.zone, "us-south-2");
            }
            SubnetParameters::ByCidr(_) => panic!("branch changed"),
        }
        assert_eq!(
            drifted_immutable_fields(&params, &observed()),
            vec!["totalIpv4AddressCount", "zone"]
        );
        assert_eq!(changed_fields(&params, &observed()), vec![SubnetField::Name]);
    }

    #[test]
    fn test_late_initialize_is_idempotent() {
        let mut params = by_count(SubnetCommon::default());
        assert!(late_initialize(&mut params, &observed()));

        let once = params.clone();
        assert!(!late_initialize(&mut params, &observed()));
        assert_eq!(params, once);
    }

    #[test]
    fn test_late_initialize_fills_branch_fields() {
        let mut params = SubnetParameters::ByTotalCount(SubnetByTotalCount::default());
        late_initialize(&mut params, &observed());
        match &params {
            SubnetParameters::ByTotalCount(p) => {
                assert_eq!(p.total_ipv4_address_count, 256);
                assert_eq!(p.zone, "us-south-1");
            }
            SubnetParameters::ByCidr(_) => panic!("branch changed"),
        }

        let mut params = SubnetParameters::ByCidr(SubnetByCidr::default());
        late_initialize(&mut params, &observed());
        match &params {
            SubnetParameters::ByCidr(p) => {
                assert_eq!(p.ipv4_cidr_block, "10.240.0.0/24");
                assert_eq!(p.zone.as_deref(), Some("us-south-1"));
            }
            SubnetParameters::ByTotalCount(_) => panic!("branch changed"),
        }
    }

    #[test]
    fn test_up_to_date_after_late_init() {
        for mut params in [by_count(SubnetCommon::default()), by_cidr(SubnetCommon::default())] {
            late_initialize(&mut params, &observed());
            assert!(is_up_to_date(&params, &observed()));
            assert!(build_patch(&params, &observed()).is_empty());
        }
    }

    #[test]
    fn test_other_branch_fields_do_not_matter() {
        let mut subnet = observed();
        subnet.ipv4_cidr_block = "10.9.9.0/24".to_string();
        subnet.total_ipv4_address_count = 1024;

        assert!(is_up_to_date(&by_count(fully_specified()), &subnet));
        assert!(is_up_to_date(&by_cidr(fully_specified()), &subnet));
    }

    #[test]
    fn test_patch_contains_only_changed_acl() {
        let mut common = fully_specified();
        common.network_acl = Some(Identity::id("acl2"));
        let params = by_count(common);

        assert!(!is_up_to_date(&params, &observed()));
        assert_eq!(changed_fields(&params, &observed()), vec![SubnetField::NetworkAcl]);
        assert_eq!(
            Value::Object(build_patch(&params, &observed())),
            json!({"network_acl": {"id": "acl2"}})
        );
    }

    #[test]
    fn test_patch_uses_canonical_id() {
        let mut common = fully_specified();
        common.public_gateway = Some(Identity::Href(
            "https://us-south.iaas.cloud.ibm.com/v1/public_gateways/pgw1".to_string(),
        ));

        let patch = build_patch(&by_count(common), &observed());

        assert_eq!(Value::Object(patch), json!({"public_gateway": {"id": "pgw1"}}));
    }

    #[test]
    fn test_patch_clears_detached_reference() {
        let mut common = fully_specified();
        common.routing_table = None;

        let patch = build_patch(&by_count(common), &observed());

        assert_eq!(Value::Object(patch), json!({"routing_table": {}}));
    }

    #[test]
    fn test_patch_keeps_crn_without_resource_segment() {
        let crn = "crn:v1:bluemix:public:is:us-south:a/123::";
        let mut common = fully_specified();
        common.routing_table = Some(Identity::Crn(crn.to_string()));

        let patch = build_patch(&by_count(common), &observed());

        assert_eq!(Value::Object(patch), json!({"routing_table": {"id": crn}}));
    }

    #[test]
    fn test_empty_and_absent_identity_are_equal() {
        let mut subnet = observed();
        subnet.public_gateway = Some(ResourceReference::default());

        assert!(is_up_to_date(&by_count(fully_specified()), &subnet));

        let mut common = fully_specified();
        common.public_gateway = Some(Identity::id(""));
        assert!(is_up_to_date(&by_count(common), &observed()));
    }

    #[test]
    fn test_unset_name_has_no_opinion() {
        let mut common = fully_specified();
        common.name = None;
        assert!(is_up_to_date(&by_count(common.clone()), &observed()));

        common.name = Some(String::new());
        assert!(is_up_to_date(&by_count(common), &observed()));
    }

    #[test]
    fn test_immutable_drift_reported() {
        let mut common = fully_specified();
        common.vpc = Some(Identity::id("vpc2"));
        let params = by_cidr(common);
        let mut subnet = observed();
        subnet.ipv4_cidr_block = "10.240.1.0/24".to_string();

        assert_eq!(drifted_immutable_fields(&params, &subnet), vec!["vpc", "ipv4CidrBlock"]);
        assert!(is_up_to_date(&params, &subnet));
    }

    #[test]
    fn test_observation_from_subnet() {
        let observation = generate_observation(&observed());
        assert_eq!(observation.status, "available");
        assert_eq!(observation.zone, "us-south-1");
        assert_eq!(observation.vpc, "vpc1");
        assert_eq!(observation.available_ipv4_address_count, 251);
    }
}
