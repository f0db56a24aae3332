use super::*;

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant
                    .to_possible_value()
                    .expect("PossibleValue should exist for all variants");
                let parsed = <$enum_type>::from_str(possible_value.get_name(), true).unwrap();
                assert_eq!(parsed, *variant, "Round-trip should preserve variant");
            }
        }
    };
}

test_enum_completeness!(LogLevel, test_log_level_completeness);
test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(TemplateFormat, test_template_format_completeness);
test_enum_completeness!(ColorIntent, test_color_intent_completeness);

#[test]
fn test_aliases_parse_case_insensitively() {
    assert_eq!(LogFormat::from_str("YML", true).unwrap(), LogFormat::Yaml);
    assert_eq!(LogFormat::from_str("plain", true).unwrap(), LogFormat::Text);
    assert_eq!(LogLevel::from_str("warning", true).unwrap(), LogLevel::Warning);
    assert_eq!(TemplateFormat::from_str("yml", true).unwrap(), TemplateFormat::Yaml);
    assert_eq!(ColorIntent::from_str("off", true).unwrap(), ColorIntent::Never);
}

#[test]
fn test_invalid_value_is_rejected() {
    assert!(TemplateFormat::from_str("xml", true).is_err());
}

#[test]
fn test_verbosity_mapping_saturates_at_trace() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Error);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(9), LogLevel::Trace);
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
}

#[test]
fn test_missing_stack_environment_message_is_fixed() {
    assert_eq!(
        ConfigError::MissingStackEnvironment.to_string(),
        MISSING_STACK_ENV_MESSAGE
    );
}

#[test]
fn test_explicit_color_intent_ignores_terminal() {
    assert!(ColorIntent::Always.resolve());
    assert!(!ColorIntent::Never.resolve());
    assert_eq!(TemplateFormat::Yaml.extension(), "yaml");
}
