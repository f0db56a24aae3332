use super::*;

#[test]
fn test_default_directives_scope_our_crates() {
    let directives = Logger::default_directives(LogLevel::Debug);
    assert_eq!(directives, "warn,stackgraph=debug,stackgraph_lib=debug");
    assert!(EnvFilter::try_new(&directives).is_ok());
}

#[test]
fn test_second_init_is_rejected() {
    let config = LoggerConfig {
        level: LogLevel::Error,
        format: LogFormat::Text,
        output: LogOutput::Stderr,
        ansi: false,
    };
    // Only this test installs the subscriber in this binary
    assert!(Logger::init(config.clone()).is_ok());
    assert!(matches!(
        Logger::init(config),
        Err(LoggerError::AlreadyInitialized)
    ));
}
