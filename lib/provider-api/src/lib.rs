//! Cloud provider API types and CRDs for Kubernetes integration
//!
//! This library defines the managed resources reconciled by the provider:
//! - VPC: Virtual private cloud networks
//! - Subnet: Address ranges inside a VPC zone
//! - ResourceInstance: Provisioned catalog service instances
//! - ResourceKey: Credentials issued for a resource instance
//! - Topic: Kafka topics in an Event Streams instance

pub mod common;
pub mod v1alpha1;

pub use common::{Condition, Identity, Managed, Reference, Selector};
pub use v1alpha1::{ResourceInstance, ResourceKey, Subnet, Topic, VPC};
