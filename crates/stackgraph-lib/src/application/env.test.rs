use super::*;
use crate::primitives::MISSING_STACK_ENV_MESSAGE;

fn vars(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    EnvironmentConfig::from_vars(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    )
    .unwrap()
}

#[test]
fn test_stack_environment_from_cdk_variables() {
    let config = vars(&[
        ("CDK_DEFAULT_ACCOUNT", "123456789012"),
        ("CDK_DEFAULT_REGION", "us-east-1"),
    ]);
    let environment = config.stack_environment().unwrap();
    assert_eq!(environment.account(), "123456789012");
    assert_eq!(environment.region(), "us-east-1");
}

#[test]
fn test_missing_account_or_region_is_fatal() {
    for pairs in [
        vec![],
        vec![("CDK_DEFAULT_ACCOUNT", "123456789012")],
        vec![("CDK_DEFAULT_REGION", "us-east-1")],
        vec![("CDK_DEFAULT_ACCOUNT", ""), ("CDK_DEFAULT_REGION", "us-east-1")],
        vec![("CDK_DEFAULT_ACCOUNT", "123456789012"), ("CDK_DEFAULT_REGION", "")],
    ] {
        let err = vars(&pairs).stack_environment().unwrap_err();
        assert!(matches!(err, ConfigError::MissingStackEnvironment));
        assert_eq!(err.to_string(), MISSING_STACK_ENV_MESSAGE);
    }
}

#[test]
fn test_no_color_environment_variable() {
    let color = vars(&[("NO_COLOR", "1")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Never);
}

#[test]
fn test_force_color_environment_variable() {
    let color = vars(&[("FORCE_COLOR", "1")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Always);
}

#[test]
fn test_environment_variable_precedence() {
    let config = vars(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    // FORCE_COLOR=1 wins over NO_COLOR and CLICOLOR
    assert_eq!(config.apply_color_config(ColorIntent::Auto), ColorIntent::Always);
}

#[test]
fn test_ci_environment_variable() {
    let config = vars(&[("CI", "true"), ("FORCE_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorIntent::Auto), ColorIntent::Never);
}

#[test]
fn test_empty_no_color_is_ignored() {
    let color = vars(&[("NO_COLOR", "")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Auto);
}

#[test]
fn test_invalid_force_color_values_ignored() {
    let color = vars(&[("FORCE_COLOR", "invalid")]).apply_color_config(ColorIntent::Always);
    assert_eq!(color, ColorIntent::Always);
}
