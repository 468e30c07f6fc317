//! Proxy-integration responses for API Gateway routes.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Response shape expected by an API Gateway Lambda proxy integration.
///
/// The body is carried as an already-encoded JSON string.
///
/// # Example
///
/// ```
/// use apigw_lambda_shared::HttpResponse;
/// use serde_json::json;
///
/// let response = HttpResponse::json(200, &json!({"message": "hi"})).unwrap();
/// assert_eq!(response.body, r#"{"message":"hi"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    /// Encode `payload` as the body of a response with `status_code`.
    pub fn json<T: Serialize>(status_code: u16, payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            status_code,
            body: serde_json::to_string(payload)?,
        })
    }

    /// Encode `payload` as the body of a `200 OK` response.
    pub fn ok<T: Serialize>(payload: &T) -> serde_json::Result<Self> {
        Self::json(StatusCode::OK.as_u16(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct TestData {
        value: i32,
    }

    #[test]
    fn test_response_serialization() {
        let response = HttpResponse::ok(&TestData { value: 42 }).unwrap();
        let json = serde_json::to_string(&response).unwrap();

        assert_eq!(json, r#"{"statusCode":200,"body":"{\"value\":42}"}"#);
    }

    #[test]
    fn test_custom_status() {
        let response = HttpResponse::json(404, &TestData { value: 1 }).unwrap();
        assert_eq!(response.status_code, 404);
    }
}
