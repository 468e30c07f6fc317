//! Lifecycle dispatch and the two-step redeploy.

use tracing::{error, info};

use apigw_lambda_shared::{
    ApiGateway, CustomResourceEvent, CustomResourceResponse, DeploymentRequest, DeploymentResult,
    PatchOperation, RequestType, Result,
};

/// Redeploys a REST API stage in response to custom-resource lifecycle events.
///
/// Holds no state between invocations beyond the client itself.
#[derive(Debug)]
pub struct Deployer<C> {
    client: C,
}

impl<C: ApiGateway> Deployer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create a deployment snapshot and repoint the stage at it.
    ///
    /// The calls are not rolled back: if the stage update fails, the snapshot
    /// created by the first call is left behind.
    pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentResult> {
        let DeploymentRequest {
            rest_api_id,
            stage_name,
        } = request;

        info!(
            rest_api_id = %rest_api_id,
            stage_name = %stage_name,
            "deploying {}/{}",
            rest_api_id,
            stage_name
        );

        // Snapshot the API's current configuration
        let deployment = self.client.create_deployment(rest_api_id).await?;

        // Point the stage at the new snapshot

        let stage = self
            .client
            .update_stage(
                rest_api_id,
                stage_name,
                vec![PatchOperation::replace_deployment(&deployment.id)],
            )
            .await
            .inspect_err(|err| {
                error!(
                    rest_api_id = %rest_api_id,
                    deployment_id = %deployment.id,
                    error = %err,
                    "stage update failed; deployment left unreferenced"
                )
            })?;

        info!(
            rest_api_id = %rest_api_id,
            stage_name = %stage_name,
            deployment_id = %deployment.id,
            "complete deploy"
        );

        Ok(DeploymentResult {
            deployment_id: deployment.id,
            stage,
        })
    }

    /// Dispatch a lifecycle event.
    ///
    /// `Create` and `Update` always mint a new deployment; `Delete` is
    /// acknowledged without validation or remote calls.
    pub async fn handle(&self, event: &CustomResourceEvent) -> Result<CustomResourceResponse> {
        match event.request_type {
            RequestType::Create | RequestType::Update => {
                let request = DeploymentRequest::from_properties(&event.resource_properties)?;
                let result = self.deploy(&request).await?;

                Ok(CustomResourceResponse::Deployed {
                    physical_resource_id: result.physical_resource_id().to_string(),
                    data: request.data(),
                })
            }
            RequestType::Delete => Ok(CustomResourceResponse::Acknowledged),
        }
    }
}
