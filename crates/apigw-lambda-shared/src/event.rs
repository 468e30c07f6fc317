//! Custom-resource lifecycle events and the responses handed back to the
//! provider framework.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Sentinel returned for lifecycle events that need no work.
pub const ACKNOWLEDGED: &str = "ok";

/// Lifecycle phase requested by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Event delivered to an on-event handler by the custom-resource provider.
///
/// Only `RequestType` is mandatory. The property bags are kept as raw JSON so
/// that a `Delete` parses whatever they hold; their shape is checked only when
/// a deployment needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,

    #[serde(default)]
    pub resource_properties: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,

    #[serde(rename = "ResponseURL", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
}

impl CustomResourceEvent {
    /// Build a bare event of the given type carrying `properties`.
    pub fn new(request_type: RequestType, resource_properties: Value) -> Self {
        Self {
            request_type,
            resource_properties,
            old_resource_properties: None,
            physical_resource_id: None,
            stack_id: None,
            request_id: None,
            logical_resource_id: None,
            resource_type: None,
            service_token: None,
            response_url: None,
        }
    }
}

/// Result returned to the provider framework.
///
/// `Deployed` serializes as `{"PhysicalResourceId": .., "Data": {..}}`;
/// `Acknowledged` serializes as the bare string `"ok"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomResourceResponse {
    Deployed {
        physical_resource_id: String,
        data: BTreeMap<String, String>,
    },
    Acknowledged,
}

impl CustomResourceResponse {
    pub fn physical_resource_id(&self) -> Option<&str> {
        match self {
            Self::Deployed {
                physical_resource_id,
                ..
            } => Some(physical_resource_id),
            Self::Acknowledged => None,
        }
    }
}

impl Serialize for CustomResourceResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Deployed {
                physical_resource_id,
                data,
            } => {
                let mut state = serializer.serialize_struct("CustomResourceResponse", 2)?;
                state.serialize_field("PhysicalResourceId", physical_resource_id)?;
                state.serialize_field("Data", data)?;
                state.end()
            }
            Self::Acknowledged => serializer.serialize_str(ACKNOWLEDGED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_provider_framework_event() {
        let event: CustomResourceEvent = serde_json::from_value(json!({
            "RequestType": "Update",
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
            "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/x",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "CustomResource",
            "PhysicalResourceId": "dep-old",
            "ResourceType": "AWS::CloudFormation::CustomResource",
            "ResourceProperties": {"API_ID": "api-123", "API_STAGE": "prod", "uuid": "u"},
            "OldResourceProperties": {"API_ID": "api-123", "API_STAGE": "prod", "uuid": "v"}
        }))
        .unwrap();

        assert_eq!(event.request_type, RequestType::Update);
        assert_eq!(event.physical_resource_id.as_deref(), Some("dep-old"));
        assert_eq!(event.resource_properties["API_ID"], "api-123");
        assert!(event.old_resource_properties.is_some());
        assert!(event.response_url.is_some());
    }

    #[test]
    fn delete_without_properties_parses() {
        let event: CustomResourceEvent =
            serde_json::from_value(json!({"RequestType": "Delete"})).unwrap();
        assert_eq!(event.request_type, RequestType::Delete);
        assert!(event.resource_properties.is_null());
    }

    #[test]
    fn delete_with_malformed_properties_parses() {
        for properties in [json!(null), json!("junk"), json!([1, 2])] {
            let event: CustomResourceEvent = serde_json::from_value(json!({
                "RequestType": "Delete",
                "ResourceProperties": properties.clone()
            }))
            .unwrap();
            assert_eq!(event.request_type, RequestType::Delete);
            assert_eq!(event.resource_properties, properties);
        }
    }

    #[test]
    fn unknown_request_type_is_rejected() {
        let result: Result<CustomResourceEvent, _> =
            serde_json::from_value(json!({"RequestType": "Rollback"}));
        assert!(result.is_err());
    }

    #[test]
    fn deployed_response_uses_provider_keys() {
        let response = CustomResourceResponse::Deployed {
            physical_resource_id: "dep-1".to_string(),
            data: BTreeMap::from([
                ("API_ID".to_string(), "api-123".to_string()),
                ("API_STAGE".to_string(), "prod".to_string()),
            ]),
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"PhysicalResourceId": "dep-1", "Data": {"API_ID": "api-123", "API_STAGE": "prod"}})
        );
        assert_eq!(response.physical_resource_id(), Some("dep-1"));
    }

    #[test]
    fn acknowledged_response_is_literal_ok() {
        let json = serde_json::to_string(&CustomResourceResponse::Acknowledged).unwrap();
        assert_eq!(json, "\"ok\"");
        assert_eq!(CustomResourceResponse::Acknowledged.physical_resource_id(), None);
    }
}
