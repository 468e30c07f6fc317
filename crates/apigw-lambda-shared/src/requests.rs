//! Deployment requests extracted from custom-resource properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{DeployError, Result};

/// Resource property naming the target REST API.
pub const API_ID: &str = "API_ID";

/// Resource property naming the stage to repoint.
pub const API_STAGE: &str = "API_STAGE";

/// Validation trait for request types built from untrusted event input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    fn validate(&self) -> Result<()>;
}

/// Target of a redeploy: which REST API and which of its stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub rest_api_id: String,
    pub stage_name: String,
}

impl DeploymentRequest {
    /// Extract and validate `API_ID` and `API_STAGE` from resource properties.
    ///
    /// Other properties (such as the `uuid` correlation token) are ignored.
    pub fn from_properties(properties: &Value) -> Result<Self> {
        let result = Self::extract(properties);
        if let Err(err) = &result {
            warn!(error = %err, "rejected deployment properties");
        }
        result
    }

    fn extract(properties: &Value) -> Result<Self> {
        let Value::Object(properties) = properties else {
            return Err(DeployError::InvalidProperties {
                found: json_type(properties),
            });
        };

        let request = Self {
            rest_api_id: string_property(properties, API_ID)?,
            stage_name: string_property(properties, API_STAGE)?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Output attributes exposed through the custom resource's `Data`.
    pub fn data(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (API_ID.to_string(), self.rest_api_id.clone()),
            (API_STAGE.to_string(), self.stage_name.clone()),
        ])
    }
}

impl Validate for DeploymentRequest {
    fn validate(&self) -> Result<()> {
        if self.rest_api_id.trim().is_empty() {
            return Err(DeployError::EmptyProperty { name: API_ID });
        }

        if self.stage_name.trim().is_empty() {
            return Err(DeployError::EmptyProperty { name: API_STAGE });
        }

        Ok(())
    }
}

fn string_property(properties: &Map<String, Value>, name: &'static str) -> Result<String> {
    match properties.get(name) {
        None => Err(DeployError::MissingProperty { name }),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(DeployError::InvalidProperty {
            name,
            found: json_type(other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
