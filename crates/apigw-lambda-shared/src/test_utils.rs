//! Test utilities for Lambda handler testing.
//!
//! This module provides sample invocation payloads and [`RecordingApiGateway`],
//! an in-memory [`ApiGateway`] that records every call and mints sequential
//! deployment ids.
//!
//! # Usage
//!
//! In your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! apigw-lambda-shared = { path = "../apigw-lambda-shared", features = ["test-utils"] }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::client::{ApiGateway, CreatedDeployment, PatchOperation, StageDescriptor};
use crate::error::{DeployError, Result};

/// REST API id used throughout the fixtures.
pub const REST_API_ID: &str = "api-123";

/// Stage name used throughout the fixtures.
pub const STAGE_NAME: &str = "prod";

/// A call observed by [`RecordingApiGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateDeployment {
        rest_api_id: String,
    },
    UpdateStage {
        rest_api_id: String,
        stage_name: String,
        patch_operations: Vec<PatchOperation>,
    },
}

/// In-memory [`ApiGateway`] double.
///
/// Deployment ids are `dep-1`, `dep-2`, ... in creation order. Either call can
/// be configured to fail with a remote error; failed calls are still recorded.
#[derive(Debug, Default)]
pub struct RecordingApiGateway {
    calls: Mutex<Vec<RecordedCall>>,
    deployments: AtomicUsize,
    create_failure: Option<String>,
    update_failure: Option<String>,
}

impl RecordingApiGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A double whose create-deployment call always fails with `message`.
    pub fn failing_create(message: impl Into<String>) -> Self {
        Self {
            create_failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// A double whose update-stage call always fails with `message`.
    pub fn failing_update(message: impl Into<String>) -> Self {
        Self {
            update_failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Number of deployment snapshots successfully created.
    pub fn deployments_created(&self) -> usize {
        self.deployments.load(Ordering::SeqCst)
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("calls lock poisoned").push(call);
    }
}

impl ApiGateway for RecordingApiGateway {
    async fn create_deployment(&self, rest_api_id: &str) -> Result<CreatedDeployment> {
        self.record(RecordedCall::CreateDeployment {
            rest_api_id: rest_api_id.to_string(),
        });

        if let Some(message) = &self.create_failure {
            return Err(DeployError::remote("CreateDeployment", message.clone()));
        }

        let sequence = self.deployments.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CreatedDeployment {
            id: format!("dep-{sequence}"),
            description: None,
        })
    }

    async fn update_stage(
        &self,
        rest_api_id: &str,
        stage_name: &str,
        patch_operations: Vec<PatchOperation>,
    ) -> Result<StageDescriptor> {
        let deployment_id = patch_operations
            .iter()
            .find(|patch| patch.path == crate::DEPLOYMENT_ID_PATH)
            .and_then(|patch| patch.value.clone());

        self.record(RecordedCall::UpdateStage {
            rest_api_id: rest_api_id.to_string(),
            stage_name: stage_name.to_string(),
            patch_operations,
        });

        if let Some(message) = &self.update_failure {
            return Err(DeployError::remote("UpdateStage", message.clone()));
        }

        Ok(StageDescriptor {
            stage_name: Some(stage_name.to_string()),
            deployment_id,
        })
    }
}

/// A custom-resource event payload as delivered by the provider framework.
pub fn lifecycle_event(request_type: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider-framework-onEvent",
        "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/fixture",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/apigw-redeploy/fixture",
        "RequestId": "fixture-request",
        "LogicalResourceId": "CustomResource",
        "ResourceType": "AWS::CloudFormation::CustomResource",
        "ResourceProperties": properties
    })
}

/// Resource properties naming [`REST_API_ID`] and [`STAGE_NAME`].
pub fn deploy_properties() -> Value {
    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider-framework-onEvent",
        "uuid": "3f1c6a0e-9a43-4d0b-8c55-0f0b1f4f6b2d",
        "API_ID": REST_API_ID,
        "API_STAGE": STAGE_NAME
    })
}

/// An API Gateway proxy event for `GET /`.
pub fn proxy_event() -> Value {
    json!({
        "resource": "/",
        "path": "/",
        "httpMethod": "GET",
        "headers": {"Accept": "application/json"},
        "queryStringParameters": null,
        "requestContext": {"stage": STAGE_NAME, "requestId": "fixture-request"},
        "body": null,
        "isBase64Encoded": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_double_mints_sequential_ids() {
        let gateway = RecordingApiGateway::new();
        let first = gateway.create_deployment(REST_API_ID).await.unwrap();
        let second = gateway.create_deployment(REST_API_ID).await.unwrap();

        assert_eq!(first.id, "dep-1");
        assert_eq!(second.id, "dep-2");
        assert_eq!(gateway.deployments_created(), 2);
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn recording_double_records_failed_update() {
        let gateway = RecordingApiGateway::failing_update("NotFoundException");
        let err = gateway
            .update_stage(
                REST_API_ID,
                STAGE_NAME,
                vec![PatchOperation::replace_deployment("dep-9")],
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("NotFoundException"));
        assert_eq!(gateway.calls().len(), 1);
    }
}
