//! Binary-level tests: argument parsing, `.env` loading, exit codes and
//! the messages a user actually sees.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCRIPT: &str = "#!/usr/bin/env bash\necho booting\n";

fn workdir(with_script: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    if with_script {
        fs::create_dir_all(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts/ec2-init.sh"), SCRIPT).unwrap();
    }
    dir
}

/// The binary run inside `dir` with no inherited target or overrides
fn stackgraph(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stackgraph").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CDK_DEFAULT_ACCOUNT")
        .env_remove("CDK_DEFAULT_REGION")
        .env_remove("STACKGRAPH_WORKDIR")
        .env_remove("STACKGRAPH_OUTPUT")
        .env_remove("STACKGRAPH_LOG_LEVEL")
        .env_remove("STACKGRAPH_LOG_FORMAT")
        .env_remove("STACKGRAPH_LOG_OUTPUT")
        .env_remove("STACKGRAPH_COLOR")
        .env("NO_COLOR", "1");
    cmd
}

fn with_target(cmd: &mut Command) -> &mut Command {
    cmd.env("CDK_DEFAULT_ACCOUNT", "123456789012")
        .env("CDK_DEFAULT_REGION", "us-east-1")
}

#[test]
fn missing_target_environment_fails_with_fixed_message() {
    let dir = workdir(true);

    stackgraph(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Environment variables CDK_DEFAULT_ACCOUNT and CDK_DEFAULT_REGION are not set.",
        ));

    assert!(!dir.path().join("cdk.out").exists());
}

#[test]
fn missing_script_fails_with_path_in_message() {
    let dir = workdir(false);

    with_target(&mut stackgraph(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to read UserData script file: scripts/ec2-init.sh",
        ));

    assert!(!dir.path().join("cdk.out").exists());
}

#[test]
fn default_command_writes_cloud_assembly() {
    let dir = workdir(true);

    with_target(&mut stackgraph(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("ZuinoServicesStack"));

    let out = dir.path().join("cdk.out");
    assert!(out.join("ZuinoServicesStack.template.json").is_file());
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(
        manifest["artifacts"]["ZuinoServicesStack"]["environment"],
        "aws://123456789012/us-east-1"
    );
}

#[test]
fn target_environment_is_read_from_dotenv() {
    let dir = workdir(true);
    fs::write(
        dir.path().join(".env"),
        "CDK_DEFAULT_ACCOUNT=210987654321\nCDK_DEFAULT_REGION=sa-east-1\n",
    )
    .unwrap();

    stackgraph(&dir).arg("synth").assert().success();

    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("cdk.out/manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        manifest["artifacts"]["ZuinoServicesStack"]["environment"],
        "aws://210987654321/sa-east-1"
    );
}

#[test]
fn synth_stdout_prints_template_only() {
    let dir = workdir(true);

    let output = with_target(&mut stackgraph(&dir))
        .args(["synth", "--stdout"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let template: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(template["Resources"].as_object().unwrap().len() >= 10);
    assert!(!dir.path().join("cdk.out").exists());
}

#[test]
fn output_flag_relocates_assembly_under_workdir() {
    let dir = workdir(true);

    with_target(&mut stackgraph(&dir))
        .args(["synth", "--format", "yaml", "--output", "build/assembly"])
        .assert()
        .success();

    assert!(
        dir.path()
            .join("build/assembly/ZuinoServicesStack.template.yaml")
            .is_file()
    );
}

#[test]
fn list_prints_declarations() {
    let dir = workdir(true);

    with_target(&mut stackgraph(&dir))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("CiCdPipeline"))
        .stdout(predicate::str::contains("EC2InstanceRole"));
}

#[test]
fn version_runs_without_target_or_script() {
    let dir = workdir(false);

    stackgraph(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("stackgraph "));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let dir = workdir(false);

    stackgraph(&dir)
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deploy"));
}
