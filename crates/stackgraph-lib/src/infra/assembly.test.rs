use super::*;
use crate::infra::resources::ApiKey;
use crate::infra::stack::StackEnvironment;
use crate::infra::synth::synthesize;
use serde_json::Value;
use tempfile::TempDir;

fn stack() -> Stack {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "eu-west-1").unwrap(),
    );
    stack.declare("Key", ApiKey::new("key")).unwrap();
    stack
}

#[test]
fn test_manifest_describes_stack_artifact() {
    let manifest = CloudAssembly::manifest(&stack(), TemplateFormat::Yaml);
    let artifact = &manifest.artifacts["TestStack"];
    assert_eq!(artifact.artifact_type, "aws:cloudformation:stack");
    assert_eq!(artifact.environment, "aws://123456789012/eu-west-1");
    assert_eq!(artifact.properties.template_file, "TestStack.template.yaml");
}

#[test]
fn test_write_creates_nested_directory_and_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("cdk.out");
    let stack = stack();
    let template = synthesize(&stack).unwrap();

    let written = CloudAssembly::new(&out)
        .write(&stack, &template, TemplateFormat::Json)
        .unwrap();

    assert_eq!(written.template, out.join("TestStack.template.json"));
    let body: Value =
        serde_json::from_str(&std::fs::read_to_string(&written.template).unwrap()).unwrap();
    assert_eq!(body["AWSTemplateFormatVersion"], "2010-09-09");

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(&written.manifest).unwrap()).unwrap();
    assert_eq!(
        manifest["artifacts"]["TestStack"]["properties"]["templateFile"],
        "TestStack.template.json"
    );
}

#[test]
fn test_write_fails_when_directory_is_a_file() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("cdk.out");
    std::fs::write(&blocker, "not a directory").unwrap();
    let stack = stack();
    let template = synthesize(&stack).unwrap();

    let err = CloudAssembly::new(&blocker)
        .write(&stack, &template, TemplateFormat::Json)
        .unwrap_err();
    assert!(matches!(err, SynthError::Io { .. }));
}
