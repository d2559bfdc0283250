//! Desired-state reconciliation engine
//!
//! This library provides:
//! - Reference resolution between managed resources
//! - Per-kind field mapping, late-initialization, comparison and patch building
//! - Connection-detail extraction from issued credentials
//! - External clients that drive each kind through the cloud APIs

pub mod connection;
pub mod error;
pub mod fields;
pub mod managed;
pub mod reference;
pub mod resource_instance;
pub mod resource_key;
pub mod subnet;
pub mod topic;
pub mod vpc;

pub use connection::{extract_connection_details, ConnectionDetails};
pub use error::{CoreError, Result};
pub use managed::{ExternalClient, ExternalCreation, ExternalObservation, ReferenceResolution};
pub use reference::{resolve, ReferenceSource, ResolutionRequest, ResolutionResponse};
pub use resource_instance::ResourceInstanceClient;
pub use resource_key::ResourceKeyClient;
pub use subnet::SubnetClient;
pub use topic::TopicClient;
pub use vpc::VpcClient;
