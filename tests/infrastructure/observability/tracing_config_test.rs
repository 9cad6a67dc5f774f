use relaychat::infrastructure::observability::TracingConfig;
use relaychat::presentation::config::{Environment, LoggingSettings};

#[test]
fn given_default_config_when_created_then_uses_local_plain_text() {
    let config = TracingConfig::default();
    assert_eq!(config.environment, Environment::Local);
    assert!(!config.json_format);
    assert!(config.default_filter.contains("relaychat"));
}

#[test]
fn given_logging_settings_when_building_config_then_copies_format_and_filter() {
    let logging = LoggingSettings {
        filter: "warn".to_string(),
        json_format: true,
    };

    let config = TracingConfig::from_settings(Environment::Prod, &logging);

    assert_eq!(config.environment, Environment::Prod);
    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn");
}
