use super::*;
use crate::primitives::ColorIntent;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    EnvironmentConfig::from_vars(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    )
    .unwrap()
}

#[test]
fn test_env_files_are_optional() {
    let dir = TempDir::new().unwrap();
    assert!(load_env_files(dir.path()).unwrap().is_empty());
}

#[test]
fn test_env_files_are_loaded_without_overriding() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "STACKGRAPH_LOADER_TEST_VALUE=from-file\nPATH=from-file\n",
    )
    .unwrap();

    let loaded = load_env_files(dir.path()).unwrap();
    assert_eq!(loaded, vec![dir.path().join(".env")]);
    assert_eq!(
        std::env::var("STACKGRAPH_LOADER_TEST_VALUE").as_deref(),
        Ok("from-file")
    );
    assert_ne!(std::env::var("PATH").as_deref(), Ok("from-file"));
}

#[test]
fn test_malformed_env_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env.local"), "NOT VALID LINE 'unterminated\n").unwrap();

    let err = load_env_files(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvFileError { .. }));
}

#[test]
fn test_environment_colour_yields_to_cli() {
    let cli = CliConfig::try_parse_from(["stackgraph", "--workdir", "/srv/stack"]).unwrap();
    let loaded = LoadedConfig::resolve(cli, env(&[("NO_COLOR", "1")])).unwrap();
    assert_eq!(loaded.app_config.color, ColorIntent::Never);

    let cli = CliConfig::try_parse_from(["stackgraph", "--workdir", "/srv/stack", "--color", "always"])
        .unwrap();
    let loaded = LoadedConfig::resolve(cli, env(&[("NO_COLOR", "1")])).unwrap();
    assert_eq!(loaded.app_config.color, ColorIntent::Always);
}

#[test]
fn test_resolve_keeps_command_and_environment() {
    let cli = CliConfig::try_parse_from(["stackgraph", "--workdir", "/srv/stack", "list"]).unwrap();
    let environment = env(&[("CDK_DEFAULT_ACCOUNT", "123456789012")]);
    let loaded = LoadedConfig::resolve(cli, environment.clone()).unwrap();

    assert_eq!(loaded.command, Some(Commands::List));
    assert_eq!(loaded.environment, environment);
    assert_eq!(
        loaded.app_config.output,
        PathBuf::from("/srv/stack/cdk.out")
    );
}
