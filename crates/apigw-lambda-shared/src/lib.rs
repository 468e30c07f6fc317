//! Shared infrastructure for the API Gateway redeploy Lambda functions.
//!
//! This crate provides common functionality used by both Lambda handlers:
//!
//! - [`CustomResourceEvent`] / [`CustomResourceResponse`]: the custom-resource
//!   lifecycle contract spoken with the provider framework
//! - [`DeploymentRequest`]: validated deployment target extracted from resource properties
//! - [`ApiGateway`]: the injectable seam over the remote API management service
//! - [`HttpResponse`]: proxy-integration response for API Gateway routes
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides sample events and a recording
//! [`ApiGateway`] double. Enable the `test-utils` feature to access it from
//! dependent crates.

#![deny(warnings)]

mod client;
mod error;
mod event;
mod requests;
mod response;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{
    ApiGateway, CreatedDeployment, DeploymentResult, PatchOp, PatchOperation, StageDescriptor,
    DEPLOYMENT_ID_PATH,
};
pub use error::{DeployError, Result};
pub use event::{CustomResourceEvent, CustomResourceResponse, RequestType, ACKNOWLEDGED};
pub use requests::{DeploymentRequest, Validate, API_ID, API_STAGE};
pub use response::HttpResponse;
pub use tracing_init::init_tracing;
