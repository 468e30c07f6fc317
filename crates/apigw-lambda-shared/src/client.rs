//! The remote API management seam used by the deployment trigger.
//!
//! Handlers never talk to the AWS SDK directly; they are generic over
//! [`ApiGateway`] so a recording double can stand in during tests.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Stage attribute that points at the active deployment snapshot.
pub const DEPLOYMENT_ID_PATH: &str = "/deploymentId";

/// JSON-patch style operations accepted by the stage update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A single patch applied to a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PatchOperation {
    /// Repoint a stage at `deployment_id`.
    pub fn replace_deployment(deployment_id: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: DEPLOYMENT_ID_PATH.to_string(),
            value: Some(deployment_id.into()),
        }
    }
}

/// Snapshot minted by the create-deployment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDeployment {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Stage state reported back by the update-stage call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub stage_name: Option<String>,
    pub deployment_id: Option<String>,
}

/// Outcome of a full redeploy: the new snapshot and the repointed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub deployment_id: String,
    pub stage: StageDescriptor,
}

impl DeploymentResult {
    /// Identifier handed back to the orchestrator as the physical resource id.
    ///
    /// Prefers the id the stage now reports, falling back to the created one.
    pub fn physical_resource_id(&self) -> &str {
        self.stage
            .deployment_id
            .as_deref()
            .unwrap_or(&self.deployment_id)
    }
}

/// Remote operations the deployment trigger needs.
pub trait ApiGateway {
    /// Create a new deployment snapshot of `rest_api_id`.
    fn create_deployment(
        &self,
        rest_api_id: &str,
    ) -> impl Future<Output = Result<CreatedDeployment>> + Send;

    /// Apply `patch_operations` to `stage_name` of `rest_api_id`.
    fn update_stage(
        &self,
        rest_api_id: &str,
        stage_name: &str,
        patch_operations: Vec<PatchOperation>,
    ) -> impl Future<Output = Result<StageDescriptor>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_deployment_targets_deployment_id() {
        let patch = PatchOperation::replace_deployment("dep-1");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"op": "replace", "path": "/deploymentId", "value": "dep-1"})
        );
    }

    #[test]
    fn physical_id_prefers_stage_report() {
        let result = DeploymentResult {
            deployment_id: "created".to_string(),
            stage: StageDescriptor {
                stage_name: Some("prod".to_string()),
                deployment_id: Some("reported".to_string()),
            },
        };
        assert_eq!(result.physical_resource_id(), "reported");

        let result = DeploymentResult {
            deployment_id: "created".to_string(),
            stage: StageDescriptor::default(),
        };
        assert_eq!(result.physical_resource_id(), "created");
    }
}
