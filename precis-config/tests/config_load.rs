use precis_common::observability::LogFormat;
use precis_config::PrecisConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_and_env_overrides_merge() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
llm:
  api_key: "${OPENAI_API_KEY}"
  model: "gpt-4o-mini"
  temperature: 0.2
  max_tokens: 512
fetch:
  timeout_secs: 12
browser:
  webdriver_url: "http://127.0.0.1:4444"
logging:
  format: json
  level: debug
  "#;
    let p = write_yaml(&tmp, "precis.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("OPENAI_API_KEY", Some("sk-from-env")),
            ("PRECIS__LLM__MODEL", Some("gpt-4o")),
            ("PRECIS__FETCH__TIMEOUT_SECS", Some("45")),
        ],
        || {
            let config = PrecisConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.llm.api_key, "sk-from-env");
            assert_eq!(config.llm.model, "gpt-4o");
            assert_eq!(config.llm.max_tokens, Some(512));
            assert_eq!(config.fetch.timeout_secs, 45);
            assert_eq!(config.fetch.user_agent, "Mozilla/5.0");
            assert_eq!(
                config.browser.webdriver_url.as_deref(),
                Some("http://127.0.0.1:4444")
            );
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.logging.level, "debug");
            config.validate().expect("valid config");
        },
    );
}

#[test]
#[serial]
fn empty_config_uses_defaults_and_env_key() {
    temp_env::with_var("OPENAI_API_KEY", Some("sk-default"), || {
        let config = PrecisConfigLoader::new().load().expect("load defaults");

        assert_eq!(config.llm.api_key, "sk-default");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.llm.max_body_chars, None);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.browser.webdriver_binary, "chromedriver");
        assert!(config.browser.sandbox);
        assert_eq!(config.browser.settle_timeout_ms, 10_000);
        assert_eq!(config.browser.settle_delay_ms, 0);
        assert_eq!(config.logging.app_name, "precis");
        assert_eq!(config.logging.format, LogFormat::Text);
        config.validate().expect("valid config");
    });
}

#[test]
#[serial]
fn missing_key_fails_validation() {
    temp_env::with_var_unset("OPENAI_API_KEY", || {
        let config = PrecisConfigLoader::new().load().expect("load defaults");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"), "{err}");
    });
}

#[test]
#[serial]
fn placeholder_for_unset_variable_fails_validation() {
    temp_env::with_var_unset("PRECIS_TEST_UNSET_KEY", || {
        let config = PrecisConfigLoader::new()
            .with_yaml_str("llm:\n  api_key: \"${PRECIS_TEST_UNSET_KEY}\"")
            .load()
            .expect("load config");
        assert_eq!(config.llm.api_key, "${PRECIS_TEST_UNSET_KEY}");
        assert!(config.validate().is_err());
    });
}

#[test]
#[serial]
fn optional_file_may_be_absent() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");

    let config = PrecisConfigLoader::new()
        .with_optional_file(&missing)
        .with_yaml_str("llm:\n  api_key: sk-inline")
        .load()
        .expect("optional file skipped");
    assert_eq!(config.llm.api_key, "sk-inline");

    let required = PrecisConfigLoader::new().with_file(&missing).load();
    assert!(required.is_err());
}

#[test]
#[serial]
fn malformed_value_is_a_load_error() {
    let result = PrecisConfigLoader::new()
        .with_yaml_str("fetch:\n  timeout_secs: soon")
        .load();
    assert!(result.is_err());
}
