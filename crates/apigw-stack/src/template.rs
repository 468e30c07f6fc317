//! CloudFormation synthesis for a [`StackDefinition`].

use serde_json::{json, Map, Value};

use crate::definition::{
    Expr, FunctionSpec, PolicyStatement, RouteSpec, StackDefinition, DEPLOY_FUNCTION,
    PROVIDER_FUNCTION, REST_API, REST_API_STAGE,
};
use crate::error::Result;

const TEMPLATE_VERSION: &str = "2010-09-09";
const BASIC_EXECUTION_POLICY: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

impl Expr {
    /// Render as a template value (intrinsics become `Ref`/`Fn::*` objects).
    pub fn to_value(&self) -> Value {
        match self {
            Expr::Literal(value) => json!(value),
            Expr::Ref(logical_id) => json!({ "Ref": logical_id }),
            Expr::GetAtt(logical_id, attribute) => json!({ "Fn::GetAtt": [logical_id, attribute] }),
            Expr::Sub(template) => json!({ "Fn::Sub": template }),
        }
    }
}

impl PolicyStatement {
    pub fn to_value(&self) -> Value {
        json!({
            "Effect": self.effect.as_str(),
            "Action": self.actions,
            "Resource": self.resources.iter().map(Expr::to_value).collect::<Vec<_>>(),
        })
    }
}

impl StackDefinition {
    /// Render the stack as a CloudFormation template.
    pub fn synthesize(&self) -> Value {
        let mut resources = Map::new();

        resources.insert(
            REST_API.to_string(),
            json!({
                "Type": "AWS::ApiGateway::RestApi",
                "Properties": { "Name": self.rest_api.name },
            }),
        );

        let methods: Vec<String> = self
            .rest_api
            .routes
            .iter()
            .map(|route| insert_route(&mut resources, route))
            .collect();

        // The initial deployment only exists so the stage can be created; the
        // custom resource repoints the stage on every stack update.
        resources.insert(
            "RestApiDeployment".to_string(),
            json!({
                "Type": "AWS::ApiGateway::Deployment",
                "DependsOn": methods,
                "Properties": { "RestApiId": Expr::reference(REST_API).to_value() },
            }),
        );
        resources.insert(
            REST_API_STAGE.to_string(),
            json!({
                "Type": "AWS::ApiGateway::Stage",
                "Properties": {
                    "RestApiId": Expr::reference(REST_API).to_value(),
                    "DeploymentId": Expr::reference("RestApiDeployment").to_value(),
                    "StageName": self.rest_api.stage_name,
                },
            }),
        );

        for function in self.functions() {
            insert_function(&mut resources, function);
        }

        insert_policy(
            &mut resources,
            &format!("{DEPLOY_FUNCTION}Policy"),
            DEPLOY_FUNCTION,
            &self.deploy_policy,
        );
        insert_policy(
            &mut resources,
            &format!("{PROVIDER_FUNCTION}Policy"),
            PROVIDER_FUNCTION,
            &PolicyStatement {
                effect: crate::definition::Effect::Allow,
                actions: vec!["lambda:InvokeFunction".to_string()],
                resources: vec![Expr::arn_of(&self.provider.on_event_handler)],
            },
        );

        let mut properties = Map::new();
        properties.insert(
            "ServiceToken".to_string(),
            self.custom_resource.service_token.to_value(),
        );
        for (key, value) in &self.custom_resource.properties {
            properties.insert(key.clone(), value.to_value());
        }
        resources.insert(
            self.custom_resource.logical_id.clone(),
            json!({
                "Type": "AWS::CloudFormation::CustomResource",
                "DependsOn": [
                    REST_API_STAGE,
                    format!("{DEPLOY_FUNCTION}Policy"),
                    format!("{PROVIDER_FUNCTION}Policy"),
                ],
                "Properties": properties,
                "UpdateReplacePolicy": "Delete",
                "DeletionPolicy": "Delete",
            }),
        );

        json!({
            "AWSTemplateFormatVersion": TEMPLATE_VERSION,
            "Description": format!(
                "{}: API Gateway with a custom resource that redeploys stage '{}' on every update",
                self.stack_name, self.rest_api.stage_name
            ),
            "Resources": resources,
            "Outputs": {
                "RestApiEndpoint": {
                    "Value": Expr::Sub(format!(
                        "https://${{{REST_API}}}.execute-api.{}.${{AWS::URLSuffix}}/{}/",
                        self.region, self.rest_api.stage_name
                    ))
                    .to_value(),
                },
                "RestApiId": { "Value": Expr::reference(REST_API).to_value() },
                "ActiveDeploymentId": {
                    "Value": Expr::reference(&self.custom_resource.logical_id).to_value(),
                },
            },
        })
    }

    /// Pretty-printed template JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.synthesize())?)
    }
}

/// Declare the resource chain, method and invoke permission for `route`,
/// returning the method's logical id.
fn insert_route(resources: &mut Map<String, Value>, route: &RouteSpec) -> String {
    let mut parent = Expr::GetAtt(REST_API.to_string(), "RootResourceId".to_string());
    let mut logical_id = REST_API.to_string();

    for segment in route.path.split('/').filter(|s| !s.is_empty()) {
        logical_id.push_str(&pascal_case(segment));
        let resource_id = format!("{logical_id}Resource");
        resources.entry(resource_id.clone()).or_insert_with(|| {
            json!({
                "Type": "AWS::ApiGateway::Resource",
                "Properties": {
                    "RestApiId": Expr::reference(REST_API).to_value(),
                    "ParentId": parent.to_value(),
                    "PathPart": segment,
                },
            })
        });
        parent = Expr::reference(&resource_id);
    }

    let method = route.method.as_str();
    let method_id = format!("{logical_id}{method}");

    resources.insert(
        method_id.clone(),
        json!({
            "Type": "AWS::ApiGateway::Method",
            "Properties": {
                "RestApiId": Expr::reference(REST_API).to_value(),
                "ResourceId": parent.to_value(),
                "HttpMethod": method,
                "AuthorizationType": "NONE",
                "Integration": {
                    "Type": "AWS_PROXY",
                    "IntegrationHttpMethod": "POST",
                    "Uri": Expr::Sub(format!(
                        "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{}.Arn}}/invocations",
                        route.function
                    ))
                    .to_value(),
                },
            },
        }),
    );

    resources.insert(
        format!("{method_id}Permission"),
        json!({
            "Type": "AWS::Lambda::Permission",
            "Properties": {
                "Action": "lambda:InvokeFunction",
                "FunctionName": Expr::arn_of(&route.function).to_value(),
                "Principal": "apigateway.amazonaws.com",
                "SourceArn": Expr::Sub(format!(
                    "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{REST_API}}}/*/{method}{}",
                    route.path
                ))
                .to_value(),
            },
        }),
    );

    method_id
}

fn insert_function(resources: &mut Map<String, Value>, function: &FunctionSpec) {
    let role_id = format!("{}Role", function.logical_id);

    resources.insert(
        role_id.clone(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "lambda.amazonaws.com" },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [Expr::Sub(BASIC_EXECUTION_POLICY.to_string()).to_value()],
            },
        }),
    );

    let mut properties = Map::new();
    if let Some(name) = &function.function_name {
        properties.insert("FunctionName".to_string(), json!(name));
    }
    properties.insert("Runtime".to_string(), json!(function.runtime));
    properties.insert("Handler".to_string(), json!(function.handler));
    properties.insert(
        "Code".to_string(),
        json!({ "S3Bucket": function.code_bucket, "S3Key": function.code_key }),
    );
    properties.insert("MemorySize".to_string(), json!(function.memory_mb));
    properties.insert("Timeout".to_string(), json!(function.timeout_secs));
    properties.insert("Role".to_string(), Expr::arn_of(&role_id).to_value());
    if !function.environment.is_empty() {
        let variables: Map<String, Value> = function
            .environment
            .iter()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect();
        properties.insert("Environment".to_string(), json!({ "Variables": variables }));
    }

    resources.insert(
        function.logical_id.clone(),
        json!({
            "Type": "AWS::Lambda::Function",
            "DependsOn": [role_id],
            "Properties": properties,
        }),
    );
}

fn insert_policy(
    resources: &mut Map<String, Value>,
    logical_id: &str,
    function: &str,
    statement: &PolicyStatement,
) {
    resources.insert(
        logical_id.to_string(),
        json!({
            "Type": "AWS::IAM::Policy",
            "Properties": {
                "PolicyName": logical_id,
                "Roles": [Expr::reference(&format!("{function}Role")).to_value()],
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [statement.to_value()],
                },
            },
        }),
    );
}

fn pascal_case(segment: &str) -> String {
    let cleaned: String = segment.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
