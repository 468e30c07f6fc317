//! [`ApiGateway`] backed by the AWS SDK.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_apigateway::error::DisplayErrorContext;
use aws_sdk_apigateway::types::{Op, PatchOperation as SdkPatchOperation};
use aws_sdk_apigateway::Client;

use apigw_lambda_shared::{
    ApiGateway, CreatedDeployment, DeployError, PatchOp, PatchOperation, Result, StageDescriptor,
};

/// Production client for the API Gateway management API.
#[derive(Debug, Clone)]
pub struct SdkApiGateway {
    client: Client,
}

impl SdkApiGateway {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Build a client from the standard AWS environment (credentials, region).
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(&config)
    }
}

impl ApiGateway for SdkApiGateway {
    async fn create_deployment(&self, rest_api_id: &str) -> Result<CreatedDeployment> {
        let output = self
            .client
            .create_deployment()
            .rest_api_id(rest_api_id)
            .send()
            .await
            .map_err(|err| {
                DeployError::remote("CreateDeployment", DisplayErrorContext(&err).to_string())
            })?;

        let id = output.id().ok_or(DeployError::MissingDeploymentId)?;

        Ok(CreatedDeployment {
            id: id.to_string(),
            description: output.description().map(str::to_string),
        })
    }

    async fn update_stage(
        &self,
        rest_api_id: &str,
        stage_name: &str,
        patch_operations: Vec<PatchOperation>,
    ) -> Result<StageDescriptor> {
        let patches = patch_operations.into_iter().map(to_sdk_patch).collect();

        let output = self
            .client
            .update_stage()
            .rest_api_id(rest_api_id)
            .stage_name(stage_name)
            .set_patch_operations(Some(patches))
            .send()
            .await
            .map_err(|err| {
                DeployError::remote("UpdateStage", DisplayErrorContext(&err).to_string())
            })?;

        Ok(StageDescriptor {
            stage_name: output.stage_name().map(str::to_string),
            deployment_id: output.deployment_id().map(str::to_string),
        })
    }
}

fn to_sdk_patch(patch: PatchOperation) -> SdkPatchOperation {
    SdkPatchOperation::builder()
        .op(to_sdk_op(patch.op))
        .path(patch.path)
        .set_value(patch.value)
        .build()
}

fn to_sdk_op(op: PatchOp) -> Op {
    match op {
        PatchOp::Add => Op::Add,
        PatchOp::Remove => Op::Remove,
        PatchOp::Replace => Op::Replace,
        PatchOp::Move => Op::Move,
        PatchOp::Copy => Op::Copy,
        PatchOp::Test => Op::Test,
    }
}
