//! API version v1alpha1 for the cloud provider CRDs

pub mod resource_instance;
pub mod resource_key;
pub mod subnet;
pub mod topic;
pub mod vpc;

pub use resource_instance::{ResourceInstance, ResourceInstanceParameters};
pub use resource_key::{ResourceKey, ResourceKeyParameters};
pub use subnet::{Subnet, SubnetBranch, SubnetParameters};
pub use topic::{Topic, TopicParameters};
pub use vpc::{VPCParameters, VPC};

/// API group for VPC networking resources
pub const VPC_GROUP: &str = "vpc.cloud.datum.net";
/// API group for resource controller resources
pub const RESOURCE_CONTROLLER_GROUP: &str = "resourcecontroller.cloud.datum.net";
/// API group for Event Streams resources
pub const EVENT_STREAMS_GROUP: &str = "eventstreams.cloud.datum.net";
/// API version for all resources
pub const API_VERSION: &str = "v1alpha1";
