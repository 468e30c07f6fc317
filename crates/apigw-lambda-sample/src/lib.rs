//! AWS Lambda function for the sample `GET /` route.
//!
//! Every invocation answers `{"message":"hello world"}` regardless of the
//! incoming proxy event, which is only logged.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use apigw_lambda_shared::{init_tracing, HttpResponse};

/// Message returned by the sample route.
pub const GREETING: &str = "hello world";

#[derive(Debug, Serialize)]
struct Greeting {
    message: &'static str,
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda handler invoked per request.
pub async fn handler(event: LambdaEvent<Value>) -> Result<HttpResponse, Error> {
    let request_id = event.context.request_id.clone();
    let method = event.payload.get("httpMethod").and_then(Value::as_str);
    let path = event.payload.get("path").and_then(Value::as_str);

    info!(request_id = %request_id, "hello world");
    info!(
        request_id = %request_id,
        method = ?method,
        path = ?path,
        event = %event.payload,
        "received proxy event"
    );

    Ok(greeting()?)
}

/// The fixed response served for every request.
pub fn greeting() -> serde_json::Result<HttpResponse> {
    HttpResponse::ok(&Greeting { message: GREETING })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigw_lambda_shared::test_utils;
    use lambda_runtime::Context;
    use serde_json::json;

    async fn invoke(payload: Value) -> HttpResponse {
        let event = LambdaEvent::new(payload, Context::default());
        handler(event).await.expect("handler should succeed")
    }

    #[test]
    fn greeting_matches_wire_format() {
        let response = greeting().unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"message":"hello world"}"#);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"statusCode": 200, "body": "{\"message\":\"hello world\"}"})
        );
    }

    #[tokio::test]
    async fn answers_proxy_event() {
        let response = invoke(test_utils::proxy_event()).await;
        assert_eq!(response, greeting().unwrap());
    }

    #[tokio::test]
    async fn ignores_event_content() {
        let payloads = [
            json!(null),
            json!({}),
            json!("not an object"),
            json!({"httpMethod": "POST", "path": "/elsewhere", "body": "{\"x\":1}"}),
        ];

        for payload in payloads {
            assert_eq!(invoke(payload).await, greeting().unwrap());
        }
    }
}
