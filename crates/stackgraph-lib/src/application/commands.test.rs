use super::*;
use crate::infra::UserDataError;
use crate::primitives::{ConfigError, MISSING_STACK_ENV_MESSAGE};
use crate::testing::TempDirFixture;
use std::path::PathBuf;

fn context(fixture: &TempDirFixture, with_env: bool) -> CommandContext {
    let environment = if with_env {
        EnvironmentConfig {
            cdk_default_account: Some("123456789012".to_string()),
            cdk_default_region: Some("us-east-1".to_string()),
            ..EnvironmentConfig::default()
        }
    } else {
        EnvironmentConfig::default()
    };
    let mut app = AppConfig {
        workdir: Some(fixture.path().to_path_buf()),
        ..AppConfig::default()
    };
    app.validate().unwrap();
    CommandContext::new(app, environment)
}

fn run(command: Commands, context: &CommandContext) -> (Result<()>, String) {
    let mut out = Vec::new();
    let result = execute_command_with_context(command, context, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_missing_environment_fails_before_script_is_read() {
    let fixture = TempDirFixture::new().unwrap();
    let (result, output) = run(Commands::default(), &context(&fixture, false));

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingStackEnvironment)
    ));
    assert_eq!(err.to_string(), MISSING_STACK_ENV_MESSAGE);
    assert!(output.is_empty());
    assert!(!fixture.file_exists("cdk.out"));
}

#[test]
fn test_missing_script_is_fatal() {
    let fixture = TempDirFixture::new().unwrap();
    let (result, _) = run(Commands::default(), &context(&fixture, true));

    let err = result.unwrap_err();
    assert!(err.downcast_ref::<UserDataError>().is_some());
    assert!(
        err.to_string()
            .starts_with("Failed to read UserData script file: scripts/ec2-init.sh")
    );
}

#[test]
fn test_synth_writes_assembly_under_workdir() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_script("echo boot\n").unwrap();
    let (result, output) = run(Commands::default(), &context(&fixture, true));

    result.unwrap();
    assert!(output.contains("ZuinoServicesStack"));
    assert!(fixture.file_exists("cdk.out/ZuinoServicesStack.template.json"));
    assert!(fixture.file_exists("cdk.out/manifest.json"));
}

#[test]
fn test_synth_to_stdout_writes_no_files() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_script("echo boot\n").unwrap();
    let command = Commands::Synth {
        format: TemplateFormat::Json,
        stdout: true,
    };
    let (result, output) = run(command, &context(&fixture, true));

    result.unwrap();
    let template: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(!fixture.file_exists("cdk.out"));
}

#[test]
fn test_synth_yaml_uses_yaml_extension() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_script("echo boot\n").unwrap();
    let command = Commands::Synth {
        format: TemplateFormat::Yaml,
        stdout: false,
    };
    let (result, _) = run(command, &context(&fixture, true));

    result.unwrap();
    assert!(fixture.file_exists("cdk.out/ZuinoServicesStack.template.yaml"));
}

#[test]
fn test_list_prints_declarations_in_dependency_order() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_script("echo boot\n").unwrap();
    let (result, output) = run(Commands::List, &context(&fixture, true));

    result.unwrap();
    let role = output.find("EC2InstanceRole").unwrap();
    let instance = output.find("AppEC2Instance").unwrap();
    let pipeline = output.find("CiCdPipeline ").unwrap();
    assert!(role < instance);
    assert!(instance < pipeline);
    assert!(output.contains("aws://123456789012/us-east-1"));
}

#[test]
fn test_version_needs_no_inputs() {
    let fixture = TempDirFixture::new().unwrap();
    let (result, output) = run(Commands::Version, &context(&fixture, false));

    result.unwrap();
    assert!(output.starts_with("stackgraph "));
}

#[test]
fn test_context_workdir_comes_from_config() {
    let fixture = TempDirFixture::new().unwrap();
    let context = context(&fixture, true);
    assert_eq!(context.workdir(), fixture.path());
    assert_eq!(context.app.output, PathBuf::from(fixture.path()).join("cdk.out"));
}
