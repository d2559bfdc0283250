//! Field-level helpers shared by the per-kind mappers
//!
//! Late-initialization only ever fills unset desired fields. Comparison
//! treats an unset desired field as having no opinion, and treats an
//! identity with an empty value the same as a missing one.

use provider_api::common::Identity;
use provider_cloud::models::{ResourceIdentity, ResourceReference};

/// Fill an unset optional from an observed value
pub fn late_init<T>(desired: &mut Option<T>, observed: Option<T>) -> bool {
    match (desired.is_none(), observed) {
        (true, Some(value)) => {
            *desired = Some(value);
            true
        }
        _ => false,
    }
}

/// Fill an unset or empty optional string from a non-empty observed value
pub fn late_init_string(desired: &mut Option<String>, observed: &str) -> bool {
    let unset = desired.as_deref().map_or(true, str::is_empty);
    if unset && !observed.is_empty() {
        *desired = Some(observed.to_string());
        return true;
    }
    false
}

/// Fill an empty required string from a non-empty observed value
pub fn late_init_required(desired: &mut String, observed: &str) -> bool {
    if desired.is_empty() && !observed.is_empty() {
        *desired = observed.to_string();
        return true;
    }
    false
}

/// Fill an unset or empty identity from an observed reference.
///
/// A missing identity is filled by id. An identity that names a
/// representation but carries no value keeps its representation.
pub fn late_init_identity(desired: &mut Option<Identity>, observed: Option<&ResourceReference>) -> bool {
    let Some(observed) = observed else {
        return false;
    };

    match desired {
        None if !observed.id.is_empty() => {
            *desired = Some(Identity::id(observed.id.clone()));
            true
        }
        Some(identity) if identity.is_empty() => {
            let value = match identity {
                Identity::Id(_) => &observed.id,
                Identity::Crn(_) => &observed.crn,
                Identity::Href(_) => &observed.href,
            };
            if value.is_empty() {
                return false;
            }
            *identity = identity.with_value(value.clone());
            true
        }
        _ => false,
    }
}

/// Desired identity rebuilt from an observed reference
pub fn identity_from_reference(reference: &ResourceReference) -> Identity {
    Identity::id(reference.id.clone())
}

/// Identity in the shape a create request accepts
pub fn identity_to_request(identity: &Identity) -> ResourceIdentity {
    match identity {
        Identity::Id(id) => ResourceIdentity::by_id(id.clone()),
        Identity::Crn(crn) => ResourceIdentity::by_crn(crn.clone()),
        Identity::Href(href) => ResourceIdentity::by_href(href.clone()),
    }
}

/// Canonical id of an identity, with empty values treated as absent
pub fn canonical_id(identity: Option<&Identity>) -> Option<&str> {
    identity.map(Identity::canonical_id).filter(|id| !id.is_empty())
}

/// Whether two identities point at the same object
pub fn identities_equal(a: Option<&Identity>, b: Option<&Identity>) -> bool {
    canonical_id(a) == canonical_id(b)
}

/// An unset or empty desired string matches anything
pub fn unset_or_equal(desired: Option<&str>, actual: Option<&str>) -> bool {
    match desired {
        None | Some("") => true,
        Some(desired) => Some(desired) == actual,
    }
}

/// Non-empty string as an optional
pub fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
