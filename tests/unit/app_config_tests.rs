/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;

use qrayti::app_config::{Config, Device, LogLevel, ModelProvider};

use crate::common;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.model.model_type, "local");
    assert_eq!(config.model.provider, ModelProvider::Ollama);
    assert_eq!(config.model.name, "phi");
    assert_eq!(config.model.endpoint, "http://localhost:11434");
    assert_eq!(config.model.device, Device::Auto);
    assert!(!config.model.load_in_8bit);
    assert_eq!(config.model.max_length, 1024);
    assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test loading a partial configuration file
#[test]
fn test_fromFile_partialFile_shouldFillDefaults() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "qrayti.json",
        br#"{ "model": { "name": "gemma:2b", "device": "cpu" }, "log_level": "debug" }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.model.name, "gemma:2b");
    assert_eq!(config.model.device, Device::Cpu);
    assert_eq!(config.model.max_length, 1024);
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that an unreadable file reports its path
#[test]
fn test_fromFile_invalidJson_shouldFailWithPath() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "broken.json", b"{ not json")?;

    let error = Config::from_file(&path).unwrap_err();

    assert!(error.to_string().contains("broken.json"));
    Ok(())
}

/// Test that environment values override the file
#[test]
fn test_applyEnvWith_afterFile_shouldOverrideFileValues() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "qrayti.json",
        br#"{ "server": { "port": 7000, "cors_origins": "*" } }"#,
    )?;
    let mut config = Config::from_file(&path)?;

    config.apply_env_with(lookup(&[("PORT", "9100"), ("LOCAL_MODEL_NAME", "mistral")]))?;

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.cors_origins_list(), vec!["*".to_string()]);
    assert_eq!(config.model.name, "mistral");
    Ok(())
}

/// Test malformed environment values
#[test]
fn test_applyEnvWith_malformedValues_shouldFail() {
    for (key, value) in [
        ("PORT", "eighty"),
        ("DEVICE", "tpu"),
        ("LOAD_IN_8BIT", "maybe"),
        ("TEMPERATURE", "hot"),
        ("MODEL_PROVIDER", "openai"),
    ] {
        let mut config = Config::default();
        assert!(
            config.apply_env_with(lookup(&[(key, value)])).is_err(),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

/// Test configuration validation
#[test]
fn test_validate_invalidValues_shouldFail() {
    let mut config = Config::default();
    config.model.name = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.model.temperature = 2.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.model.max_length = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.port = 0;
    assert!(config.validate().is_err());
}

/// Test the origin list parsing
#[test]
fn test_corsOriginsList_withBlanks_shouldSkipThem() {
    let mut config = Config::default();
    config.server.cors_origins = " http://a.test , ,http://b.test,".to_string();

    assert_eq!(
        config.server.cors_origins_list(),
        vec!["http://a.test".to_string(), "http://b.test".to_string()]
    );
}

/// Test the model label reported by the health endpoint
#[test]
fn test_describe_shouldCombineTypeAndName() {
    let mut config = Config::default();
    config.model.name = "gemma:2b".to_string();
    assert_eq!(config.model.describe(), "local (gemma:2b)");
}
