//! Explicit stack model built from a validated [`StackConfig`].
//!
//! Resources reference one another by logical id through [`Expr`], so the
//! wiring is visible in the data rather than hidden in construction order.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::config::StackConfig;
use crate::error::Result;

pub const REST_API: &str = "RestApi";
pub const REST_API_STAGE: &str = "RestApiStage";
pub const SAMPLE_FUNCTION: &str = "SampleFunction";
pub const DEPLOY_FUNCTION: &str = "DeployFunction";
pub const PROVIDER_FUNCTION: &str = "ProviderFunction";
pub const CUSTOM_RESOURCE: &str = "CustomResource";

/// Lambda runtime for the Rust `bootstrap` binaries.
pub const RUST_RUNTIME: &str = "provided.al2023";

/// Environment variable through which the provider framework locates the
/// on-event handler.
pub const ON_EVENT_ARN_ENV: &str = "USER_ON_EVENT_FUNCTION_ARN";

/// A template value: either a literal or a CloudFormation intrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    Ref(String),
    GetAtt(String, String),
    Sub(String),
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn reference(logical_id: &str) -> Self {
        Self::Ref(logical_id.to_string())
    }

    pub fn arn_of(logical_id: &str) -> Self {
        Self::GetAtt(logical_id.to_string(), "Arn".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// A route on the REST API proxied to a Lambda function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub path: String,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApiSpec {
    pub logical_id: String,
    pub name: String,
    pub stage_name: String,
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub logical_id: String,
    pub function_name: Option<String>,
    pub runtime: String,
    pub handler: String,
    pub code_bucket: String,
    pub code_key: String,
    pub memory_mb: u32,
    pub timeout_secs: u32,
    pub environment: BTreeMap<String, Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
        }
    }
}

/// IAM statement attached to a function's execution role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<Expr>,
}

/// Custom-resource provider: a framework function relaying lifecycle events
/// to the user's on-event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    pub framework: FunctionSpec,
    pub on_event_handler: String,
}

impl ProviderSpec {
    /// Token custom resources use to reach this provider.
    pub fn service_token(&self) -> Expr {
        Expr::arn_of(&self.framework.logical_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceSpec {
    pub logical_id: String,
    pub service_token: Expr,
    pub properties: BTreeMap<String, Expr>,
}

/// Fully wired, validated stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDefinition {
    pub stack_name: String,
    pub region: String,
    pub rest_api: RestApiSpec,
    pub sample_function: FunctionSpec,
    pub deploy_function: FunctionSpec,
    pub deploy_policy: PolicyStatement,
    pub provider: ProviderSpec,
    pub custom_resource: CustomResourceSpec,
    pub correlation_token: Uuid,
}

impl StackDefinition {
    pub fn builder(config: StackConfig) -> StackDefinitionBuilder {
        StackDefinitionBuilder::new(config)
    }

    /// Every function the stack deploys, in declaration order.
    pub fn functions(&self) -> [&FunctionSpec; 3] {
        [
            &self.sample_function,
            &self.deploy_function,
            &self.provider.framework,
        ]
    }
}

/// Builds a [`StackDefinition`] from a [`StackConfig`] plus overrides.
#[derive(Debug, Clone)]
pub struct StackDefinitionBuilder {
    config: StackConfig,
    correlation_token: Option<Uuid>,
}

impl StackDefinitionBuilder {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            correlation_token: None,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    pub fn stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.config.stage_name = stage_name.into();
        self
    }

    /// Pin the correlation token instead of generating a fresh one.
    pub fn correlation_token(mut self, token: Uuid) -> Self {
        self.correlation_token = Some(token);
        self
    }

    /// Validate the config and wire every resource.
    ///
    /// Unless pinned, each call draws a new random correlation token, so the
    /// custom resource's properties always differ from the previous
    /// deployment and the orchestrator always sends an `Update`.
    pub fn build(self) -> Result<StackDefinition> {
        let Self {
            config,
            correlation_token,
        } = self;
        config.validate()?;

        let region = config.resolved_region();
        let prefix = &config.prefix;
        let correlation_token = correlation_token.unwrap_or_else(Uuid::new_v4);

        let rest_api = RestApiSpec {
            logical_id: REST_API.to_string(),
            name: format!("{prefix}-api"),
            stage_name: config.stage_name.clone(),
            routes: vec![RouteSpec {
                method: HttpMethod::Get,
                path: "/".to_string(),
                function: SAMPLE_FUNCTION.to_string(),
            }],
        };

        let sample_function = FunctionSpec {
            logical_id: SAMPLE_FUNCTION.to_string(),
            function_name: Some(format!("{prefix}-sample")),
            runtime: RUST_RUNTIME.to_string(),
            handler: "bootstrap".to_string(),
            code_bucket: config.asset_bucket.clone(),
            code_key: config.sample_function.asset.clone(),
            memory_mb: config.sample_function.memory_mb,
            timeout_secs: config.sample_function.timeout_secs,
            environment: BTreeMap::new(),
        };

        let deploy_function = FunctionSpec {
            logical_id: DEPLOY_FUNCTION.to_string(),
            function_name: Some(format!("{prefix}-api-deploy")),
            runtime: RUST_RUNTIME.to_string(),
            handler: "bootstrap".to_string(),
            code_bucket: config.asset_bucket.clone(),
            code_key: config.deploy_function.asset.clone(),
            memory_mb: config.deploy_function.memory_mb,
            timeout_secs: config.deploy_function.timeout_secs,
            environment: BTreeMap::new(),
        };

        // CreateDeployment is a POST and UpdateStage a PATCH on the API's
        // own resource tree; nothing else is granted.
        let deploy_policy = PolicyStatement {
            effect: Effect::Allow,
            actions: vec!["apigateway:POST".to_string(), "apigateway:PATCH".to_string()],
            resources: vec![Expr::Sub(format!(
                "arn:aws:apigateway:{region}::/restapis/${{{REST_API}}}/*"
            ))],
        };

        let provider = ProviderSpec {
            framework: FunctionSpec {
                logical_id: PROVIDER_FUNCTION.to_string(),
                function_name: None,
                runtime: config.provider.runtime.clone(),
                handler: config.provider.handler.clone(),
                code_bucket: config.asset_bucket.clone(),
                code_key: config.provider.asset.clone(),
                memory_mb: 128,
                timeout_secs: config.provider.timeout_secs,
                environment: BTreeMap::from([(
                    ON_EVENT_ARN_ENV.to_string(),
                    Expr::arn_of(DEPLOY_FUNCTION),
                )]),
            },
            on_event_handler: DEPLOY_FUNCTION.to_string(),
        };

        let custom_resource = CustomResourceSpec {
            logical_id: CUSTOM_RESOURCE.to_string(),
            service_token: provider.service_token(),
            properties: BTreeMap::from([
                ("uuid".to_string(), Expr::literal(correlation_token.to_string())),
                ("API_ID".to_string(), Expr::reference(REST_API)),
                ("API_STAGE".to_string(), Expr::reference(REST_API_STAGE)),
            ]),
        };

        Ok(StackDefinition {
            stack_name: config.stack_name,
            region,
            rest_api,
            sample_function,
            deploy_function,
            deploy_policy,
            provider,
            custom_resource,
            correlation_token,
        })
    }
}
