//! Stack definition for the API Gateway redeploy stack.
//!
//! A [`StackConfig`] is validated and wired into a [`StackDefinition`] by
//! [`StackDefinitionBuilder`], which [`StackDefinition::synthesize`] renders
//! as a CloudFormation template.

pub mod config;
pub mod definition;
pub mod error;
mod template;

pub use config::{FunctionConfig, ProviderConfig, StackConfig, DEFAULT_REGION};
pub use definition::{
    CustomResourceSpec, Effect, Expr, FunctionSpec, HttpMethod, PolicyStatement, ProviderSpec,
    RestApiSpec, RouteSpec, StackDefinition, StackDefinitionBuilder,
};
pub use error::{Error, Result};
