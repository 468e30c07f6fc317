//! Stack configuration, loaded from JSON and validated before synthesis.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Region used when neither the config, the CLI nor `AWS_REGION` name one.
pub const DEFAULT_REGION: &str = "us-east-1";

const LAMBDA_NAME_MAX: usize = 64;

/// Settings for one Lambda function deployed by the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionConfig {
    /// Object key of the zipped `bootstrap` binary inside the asset bucket.
    pub asset: String,
    #[serde(default = "default_memory_mb")]
    pub memory_mb: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
}

impl FunctionConfig {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            memory_mb: default_memory_mb(),
            timeout_secs: default_timeout_secs(),
        }
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        if self.asset.trim().is_empty() {
            return Err(Error::invalid(field, "asset cannot be empty"));
        }
        if !(128..=10_240).contains(&self.memory_mb) {
            return Err(Error::invalid(
                field,
                format!("memory_mb must be within 128..=10240, got {}", self.memory_mb),
            ));
        }
        if !(1..=900).contains(&self.timeout_secs) {
            return Err(Error::invalid(
                field,
                format!("timeout_secs must be within 1..=900, got {}", self.timeout_secs),
            ));
        }
        Ok(())
    }
}

/// Settings for the custom-resource provider framework function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub asset: String,
    pub runtime: String,
    pub handler: String,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            asset: "provider-framework.zip".to_string(),
            runtime: "nodejs20.x".to_string(),
            handler: "framework.onEvent".to_string(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Declarative inputs of the stack.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
    pub stack_name: String,
    /// Prefix for the REST API and function names.
    pub prefix: String,
    pub region: Option<String>,
    pub stage_name: String,
    /// S3 bucket holding the function code archives.
    pub asset_bucket: String,
    pub sample_function: FunctionConfig,
    pub deploy_function: FunctionConfig,
    pub provider: ProviderConfig,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: "CdkCustomResourceStack".to_string(),
            prefix: "cdk-custom-resource".to_string(),
            region: None,
            stage_name: "prod".to_string(),
            asset_bucket: "apigw-redeploy-assets".to_string(),
            sample_function: FunctionConfig::new("apigw-lambda-sample.zip"),
            deploy_function: FunctionConfig::new("apigw-lambda-deploy.zip"),
            provider: ProviderConfig::default(),
        }
    }
}

impl StackConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Region from the config, else `AWS_REGION`, else [`DEFAULT_REGION`].
    pub fn resolved_region(&self) -> String {
        self.region
            .clone()
            .or_else(|| env::var("AWS_REGION").ok().filter(|r| !r.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// Check every field against the limits CloudFormation, Lambda and API
    /// Gateway enforce, so a bad value fails here instead of mid-deploy.
    pub fn validate(&self) -> Result<()> {
        validate_stack_name(&self.stack_name)?;
        validate_prefix(&self.prefix)?;
        validate_region(&self.resolved_region())?;
        validate_stage_name(&self.stage_name)?;

        if self.asset_bucket.trim().is_empty() {
            return Err(Error::invalid("asset_bucket", "cannot be empty"));
        }

        self.sample_function.validate("sample_function")?;
        self.deploy_function.validate("deploy_function")?;

        if self.provider.asset.trim().is_empty()
            || self.provider.runtime.trim().is_empty()
            || self.provider.handler.trim().is_empty()
        {
            return Err(Error::invalid(
                "provider",
                "asset, runtime and handler are required",
            ));
        }
        if !(1..=900).contains(&self.provider.timeout_secs) {
            return Err(Error::invalid(
                "provider",
                format!(
                    "timeout_secs must be within 1..=900, got {}",
                    self.provider.timeout_secs
                ),
            ));
        }

        Ok(())
    }
}

fn validate_stack_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_alpha || name.len() > 128 || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(Error::invalid(
            "stack_name",
            format!("'{name}' must start with a letter and contain only letters, digits and hyphens"),
        ));
    }
    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(Error::invalid("prefix", "cannot be empty"));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid(
            "prefix",
            format!("'{prefix}' may only contain letters, digits, hyphens and underscores"),
        ));
    }
    // The longest derived name is `{prefix}-api-deploy`.
    if prefix.len() + "-api-deploy".len() > LAMBDA_NAME_MAX {
        return Err(Error::invalid(
            "prefix",
            format!("'{prefix}' is too long for derived function names"),
        ));
    }
    Ok(())
}

fn validate_region(region: &str) -> Result<()> {
    let parts: Vec<&str> = region.split('-').collect();
    let well_formed = parts.len() >= 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        && parts
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

    if !well_formed {
        return Err(Error::invalid(
            "region",
            format!("'{region}' is not a region name like us-east-1"),
        ));
    }
    Ok(())
}

fn validate_stage_name(stage: &str) -> Result<()> {
    if stage.is_empty()
        || !stage
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid(
            "stage_name",
            format!("'{stage}' may only contain letters, digits, hyphens and underscores"),
        ));
    }
    Ok(())
}

fn default_memory_mb() -> u32 {
    128
}

fn default_timeout_secs() -> u32 {
    30
}

fn default_provider_timeout_secs() -> u32 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_region(region: &str) -> StackConfig {
        StackConfig {
            region: Some(region.to_string()),
            ..StackConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(with_region("eu-west-2").validate().is_ok());
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: StackConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StackConfig::default());
    }

    #[test]
    fn partial_function_config_fills_limits() {
        let config: StackConfig =
            serde_json::from_str(r#"{"deploy_function": {"asset": "deploy.zip"}}"#).unwrap();
        assert_eq!(config.deploy_function.asset, "deploy.zip");
        assert_eq!(config.deploy_function.memory_mb, 128);
        assert_eq!(config.deploy_function.timeout_secs, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<StackConfig, _> =
            serde_json::from_str(r#"{"stage": "prod"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let config = StackConfig {
            prefix: String::new(),
            ..with_region("us-east-1")
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("prefix"));
    }

    #[test]
    fn long_prefix_is_rejected() {
        let config = StackConfig {
            prefix: "p".repeat(60),
            ..with_region("us-east-1")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_region_is_rejected() {
        for region in ["useast1", "US-EAST-1", "us-east-", "us-east-one"] {
            assert!(with_region(region).validate().is_err(), "{region}");
        }
        assert!(with_region("us-gov-west-1").validate().is_ok());
    }

    #[test]
    fn invalid_stage_is_rejected() {
        let config = StackConfig {
            stage_name: "prod/v1".to_string(),
            ..with_region("us-east-1")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_memory_is_rejected() {
        let mut config = with_region("us-east-1");
        config.sample_function.memory_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sample_function"));
    }

    #[test]
    fn stack_name_must_start_with_letter() {
        let config = StackConfig {
            stack_name: "1stack".to_string(),
            ..with_region("us-east-1")
        };
        assert!(config.validate().is_err());
    }
}
