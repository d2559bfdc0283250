//! Cloud API integration
//!
//! Typed request/response models, one trait per API, and an HTTP
//! implementation authenticated with IAM bearer tokens.
pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use api::{CatalogApi, EventStreamsAdminApi, ResourceControllerApi, VpcApi};
pub use auth::IamAuthenticator;
pub use client::{CloudClient, Endpoints};
pub use error::{CloudError, Result};

#[cfg(any(test, feature = "mock"))]
pub use api::{MockCatalogApi, MockEventStreamsAdminApi, MockResourceControllerApi, MockVpcApi};
