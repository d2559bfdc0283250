//! Identities of other cloud objects

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which representation an [`Identity`] was written in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityKind {
    Id,
    Crn,
    Href,
}

/// Reference to another cloud object by exactly one of its equivalent
/// representations.
///
/// Serialized in the same shape the cloud API accepts, e.g. `{"id": "r006-..."}`
/// or `{"crn": "crn:v1:..."}`. Resource group identities ("identity" and
/// "identity by id" on the wire) both use this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Identity {
    /// Object id
    Id(String),
    /// Cloud resource name
    Crn(String),
    /// Canonical URL of the object
    Href(String),
}

impl Identity {
    pub fn id(id: impl Into<String>) -> Self {
        Identity::Id(id.into())
    }

    /// The representation this identity is expressed in
    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::Id(_) => IdentityKind::Id,
            Identity::Crn(_) => IdentityKind::Crn,
            Identity::Href(_) => IdentityKind::Href,
        }
    }

    /// Raw value of whichever representation is set
    pub fn value(&self) -> &str {
        match self {
            Identity::Id(v) | Identity::Crn(v) | Identity::Href(v) => v,
        }
    }

    /// An identity carrying an empty value identifies nothing
    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    /// Same representation, new value
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        match self.kind() {
            IdentityKind::Id => Identity::Id(value.into()),
            IdentityKind::Crn => Identity::Crn(value.into()),
            IdentityKind::Href => Identity::Href(value.into()),
        }
    }

    /// The object id this identity points at.
    ///
    /// Hrefs end in `/<id>` and CRNs end in `:<id>`, so every representation
    /// reduces to the same id. A CRN with an empty resource segment (`...::`)
    /// identifies the object by the whole CRN.
    pub fn canonical_id(&self) -> &str {
        match self {
            Identity::Id(v) => v,
            Identity::Href(v) => v.trim_end_matches('/').rsplit('/').next().unwrap_or_default(),
            Identity::Crn(v) => match v.rsplit(':').next() {
                Some(id) if !id.is_empty() => id,
                _ => v,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_wire_shape() {
        let identity = Identity::id("acl1");
        assert_eq!(serde_json::to_value(&identity).unwrap(), serde_json::json!({"id": "acl1"}));

        let parsed: Identity = serde_json::from_value(serde_json::json!({"crn": "crn:v1:x"})).unwrap();
        assert_eq!(parsed.kind(), IdentityKind::Crn);
    }

    #[test]
    fn test_identity_canonical_id() {
        assert_eq!(Identity::id("r006-1").canonical_id(), "r006-1");
        assert_eq!(
            Identity::Href("https://us-south.iaas.cloud.ibm.com/v1/network_acls/r006-1".to_string()).canonical_id(),
            "r006-1"
        );
        assert_eq!(
            Identity::Crn("crn:v1:bluemix:public:is:us-south:a/123::network-acl:r006-1".to_string()).canonical_id(),
            "r006-1"
        );
    }

    #[test]
    fn test_crn_without_resource_segment_keeps_whole_crn() {
        let crn = "crn:v1:bluemix:public:resource-controller:global:a/123::";
        let identity = Identity::Crn(crn.to_string());

        assert_eq!(identity.canonical_id(), crn);
        assert!(!identity.is_empty());
        assert!(Identity::Crn(String::new()).canonical_id().is_empty());
    }

    #[test]
    fn test_identity_empty() {
        assert!(Identity::id("").is_empty());
        assert!(!Identity::id("x").is_empty());
        assert_eq!(Identity::Crn(String::new()).with_value("c"), Identity::Crn("c".to_string()));
    }
}
