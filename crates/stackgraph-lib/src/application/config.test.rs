use super::*;

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, 0);
    assert_eq!(config.output, PathBuf::from("cdk.out"));
    assert_eq!(config.color, ColorIntent::Auto);
    assert_eq!(config.log_format, LogFormat::Text);
    assert!(config.workdir.is_none());
    assert_eq!(config.workdir(), Path::new("."));
}

#[test]
fn test_config_merging() {
    let base = AppConfig {
        log_format: LogFormat::Json,
        ..AppConfig::default()
    };
    let override_config = AppConfig {
        log_level: 3,
        color: ColorIntent::Never,
        output: PathBuf::from("out"),
        ..AppConfig::default()
    };

    let merged = base.merge_with(override_config);
    assert_eq!(merged.log_level, 3);
    assert_eq!(merged.color, ColorIntent::Never);
    assert_eq!(merged.output, PathBuf::from("out"));
    // Defaults in the override never clobber earlier layers
    assert_eq!(merged.log_format, LogFormat::Json);
}

#[test]
fn test_validate_anchors_relative_output_to_workdir() {
    let mut config = AppConfig {
        workdir: Some(PathBuf::from("/srv/stack")),
        ..AppConfig::default()
    };
    config.validate().unwrap();
    assert_eq!(config.output, PathBuf::from("/srv/stack/cdk.out"));
    assert_eq!(config.workdir(), Path::new("/srv/stack"));
}

#[test]
fn test_validate_keeps_absolute_output() {
    let mut config = AppConfig {
        workdir: Some(PathBuf::from("/srv/stack")),
        output: PathBuf::from("/tmp/assembly"),
        ..AppConfig::default()
    };
    config.validate().unwrap();
    assert_eq!(config.output, PathBuf::from("/tmp/assembly"));
}

#[test]
fn test_validate_rejects_out_of_range_level() {
    let mut config = AppConfig {
        log_level: 9,
        ..AppConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_logger_config_follows_app_config() {
    let config = AppConfig {
        log_level: 2,
        log_output: LogOutput::Stdout,
        ..AppConfig::default()
    };
    let logger = config.to_logger_config(true);
    assert_eq!(logger.level, LogLevel::Info);
    assert_eq!(logger.output, LogOutput::Stdout);
    assert!(logger.ansi);
}
