//! Types shared by every managed resource kind
//!
//! Identities, references and selectors embedded in desired state, the
//! status conditions, and the external-name annotation that links a
//! managed resource to its cloud object.

pub mod condition;
pub mod identity;
pub mod reference;

pub use condition::{set_condition, Condition, ConditionReason, ConditionStatus, ConditionType};
pub use identity::{Identity, IdentityKind};
pub use reference::{DeletionPolicy, Reference, SecretReference, Selector};

use kube::{Resource, ResourceExt};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Annotation holding the identifier of the cloud object
pub const EXTERNAL_NAME_ANNOTATION: &str = "cloud.datum.net/external-name";

/// The cloud identifier recorded on a managed resource, if any
pub fn external_name<K: ResourceExt>(obj: &K) -> Option<&str> {
    obj.annotations()
        .get(EXTERNAL_NAME_ANNOTATION)
        .map(String::as_str)
        .filter(|name| !name.is_empty())
}

/// Record the cloud identifier on a managed resource
pub fn set_external_name<K: ResourceExt>(obj: &mut K, name: impl Into<String>) {
    obj.annotations_mut()
        .insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.into());
}

/// Behaviour common to all managed resources, used by the generic lifecycle
pub trait Managed:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn conditions(&self) -> &[Condition];

    fn set_condition(&mut self, condition: Condition);

    fn deletion_policy(&self) -> DeletionPolicy;

    /// Where connection details are published
    fn connection_secret_ref(&self) -> Option<&SecretReference>;
}

macro_rules! impl_managed {
    ($kind:ty) => {
        impl $crate::common::Managed for $kind {
            fn conditions(&self) -> &[$crate::common::Condition] {
                self.status
                    .as_ref()
                    .map(|status| status.conditions.as_slice())
                    .unwrap_or_default()
            }

            fn set_condition(&mut self, condition: $crate::common::Condition) {
                let status = self.status.get_or_insert_with(Default::default);
                $crate::common::set_condition(&mut status.conditions, condition);
            }

            fn deletion_policy(&self) -> $crate::common::DeletionPolicy {
                self.spec.deletion_policy
            }

            fn connection_secret_ref(&self) -> Option<&$crate::common::SecretReference> {
                self.spec.write_connection_secret_to_ref.as_ref()
            }
        }
    };
}

pub(crate) use impl_managed;

/// Schema for free-form JSON fields
pub fn preserve_unknown_fields(_: &mut SchemaGenerator) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_string(),
        serde_json::Value::Bool(true),
    );
    Schema::Object(schema)
}
