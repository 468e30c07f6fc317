//! Integration tests for the `apigw-stack` CLI.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("apigw-stack").expect("binary exists");
    cmd.env_remove("AWS_REGION");
    cmd
}

fn synth_stdout(args: &[&str]) -> Value {
    let output = cli().arg("synth").args(args).output().expect("run synth");
    assert!(output.status.success(), "synth failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("template is JSON")
}

#[test]
fn synth_prints_template_with_defaults() {
    let template = synth_stdout(&[]);

    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(
        template["Resources"]["RestApi"]["Properties"]["Name"],
        "cdk-custom-resource-api"
    );
    assert_eq!(
        template["Resources"]["DeployFunctionPolicy"]["Properties"]["PolicyDocument"]
            ["Statement"][0]["Resource"][0]["Fn::Sub"],
        "arn:aws:apigateway:us-east-1::/restapis/${RestApi}/*"
    );
}

#[test]
fn every_synth_draws_a_new_correlation_token() {
    let first = synth_stdout(&["--region", "eu-west-1"]);
    let second = synth_stdout(&["--region", "eu-west-1"]);

    let token = |t: &Value| t["Resources"]["CustomResource"]["Properties"]["uuid"].clone();
    assert!(token(&first).is_string());
    assert_ne!(token(&first), token(&second));
}

#[test]
fn synth_writes_output_file_with_overrides() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("template.json");

    cli()
        .args(["synth", "--stage", "beta", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Template written to"));

    let template: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read template")).unwrap();
    assert_eq!(
        template["Resources"]["RestApiStage"]["Properties"]["StageName"],
        "beta"
    );
}

#[test]
fn config_file_is_applied() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("stack.json");
    fs::write(
        &path,
        r#"{"prefix": "demo", "region": "ap-northeast-1", "asset_bucket": "demo-assets"}"#,
    )
    .unwrap();

    let output = cli()
        .arg("--config")
        .arg(&path)
        .arg("synth")
        .output()
        .expect("run synth");
    assert!(output.status.success());

    let template: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        template["Resources"]["SampleFunction"]["Properties"]["FunctionName"],
        "demo-sample"
    );
    assert_eq!(
        template["Resources"]["SampleFunction"]["Properties"]["Code"]["S3Bucket"],
        "demo-assets"
    );
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("stack.json");
    fs::write(&path, r#"{"prefix": ""}"#).unwrap();

    cli()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("prefix"));
}

#[test]
fn invalid_region_override_fails() {
    cli()
        .args(["synth", "--region", "mars"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("region"));
}

#[test]
fn validate_reports_resolved_region() {
    cli()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("us-east-1"));
}
