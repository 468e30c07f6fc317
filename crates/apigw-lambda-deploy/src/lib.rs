//! AWS Lambda custom-resource handler that forces an API Gateway redeploy.
//!
//! Registered as the on-event handler of a custom-resource provider. On
//! `Create` and `Update` it snapshots the REST API named by `API_ID` and
//! repoints the `API_STAGE` stage at the snapshot; `Delete` is a no-op.

mod deployer;
mod sdk;

use std::sync::OnceLock;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use apigw_lambda_shared::{init_tracing, ApiGateway, CustomResourceEvent, CustomResourceResponse};

pub use deployer::Deployer;
pub use sdk::SdkApiGateway;

/// Client built once at cold start and reused across invocations.
static DEPLOYER: OnceLock<Deployer<SdkApiGateway>> = OnceLock::new();

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    let gateway = SdkApiGateway::from_env().await;
    if DEPLOYER.set(Deployer::new(gateway)).is_err() {
        warn!("deployer already initialized; keeping existing client");
    }

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda handler invoked per lifecycle event.
pub async fn handler(event: LambdaEvent<Value>) -> Result<CustomResourceResponse, Error> {
    let deployer = DEPLOYER
        .get()
        .ok_or("deployer not initialized; call run() first")?;
    handle_event(deployer, event).await
}

/// Core handler logic, generic over the client so tests can inject a double.
///
/// Errors are logged and returned unchanged so the provider marks the
/// resource operation as failed.
pub async fn handle_event<C: ApiGateway>(
    deployer: &Deployer<C>,
    event: LambdaEvent<Value>,
) -> Result<CustomResourceResponse, Error> {
    // Log the raw invocation
    let LambdaEvent { payload, context } = event;
    let request_id = context.request_id.clone();

    info!(request_id = %request_id, event = %payload, "received lifecycle event");
    info!(
        request_id = %request_id,
        invoked_function_arn = %context.invoked_function_arn,
        deadline_ms = context.deadline,
        "invocation context"
    );

    // Parse the lifecycle event
    let event: CustomResourceEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse lifecycle event");
            return Err(apigw_lambda_shared::DeployError::from(e).into());
        }
    };

    // Dispatch and report the outcome
    match deployer.handle(&event).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                request_type = %event.request_type,
                physical_resource_id = ?response.physical_resource_id(),
                "lifecycle event handled"
            );
            Ok(response)
        }
        Err(e) => {
            error!(
                request_id = %request_id,
                request_type = %event.request_type,
                error = %e,
                "lifecycle event failed"
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigw_lambda_shared::test_utils::{self, RecordingApiGateway};
    use lambda_runtime::Context;
    use serde_json::json;

    fn lambda_event(payload: Value) -> LambdaEvent<Value> {
        LambdaEvent::new(payload, Context::default())
    }

    #[tokio::test]
    async fn delete_with_null_properties_is_acknowledged() {
        let deployer = Deployer::new(RecordingApiGateway::new());
        let payload = json!({"RequestType": "Delete", "ResourceProperties": null});

        let response = handle_event(&deployer, lambda_event(payload)).await.unwrap();

        assert_eq!(response, CustomResourceResponse::Acknowledged);
        assert!(deployer.client().calls().is_empty());
    }

    #[tokio::test]
    async fn handles_create_event_payload() {
        let deployer = Deployer::new(RecordingApiGateway::new());
        let payload = test_utils::lifecycle_event("Create", test_utils::deploy_properties());

        let response = handle_event(&deployer, lambda_event(payload)).await.unwrap();

        assert_eq!(response.physical_resource_id(), Some("dep-1"));
        assert_eq!(deployer.client().calls().len(), 2);
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let deployer = Deployer::new(RecordingApiGateway::new());
        let err = handle_event(&deployer, lambda_event(json!({"RequestType": 3})))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid custom resource event"));
        assert!(deployer.client().calls().is_empty());
    }

    #[tokio::test]
    async fn handler_requires_initialized_client() {
        let payload = test_utils::lifecycle_event("Delete", json!({}));
        let err = handler(lambda_event(payload)).await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }
}
