//! Loader for precis configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional YAML file (by default
//! `~/.config/precis/precis.yaml`), inline YAML, then `PRECIS__`-prefixed
//! environment variables with `__` between path segments, e.g.
//! `PRECIS__LLM__MODEL=gpt-4o`. String values may reference other variables as
//! `${VAR}`; these are expanded after merging. Every field has a default, so
//! an empty configuration is valid as long as `OPENAI_API_KEY` is set.
use config::{Config, ConfigError, Environment, File};
use precis_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Variable consulted when `llm.api_key` is not configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrecisConfig {
    pub llm: LlmSection,
    pub fetch: FetchSection,
    pub browser: BrowserSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Cut page bodies to this many characters before prompting.
    pub max_body_chars: Option<usize>,
    pub timeout_secs: u64,
    /// Check the key against the service before serving.
    pub verify: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/v1".into(),
            temperature: None,
            max_tokens: None,
            max_body_chars: None,
            timeout_secs: 60,
            verify: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub webdriver_binary: String,
    /// Use an already running WebDriver server instead of spawning one.
    pub webdriver_url: Option<String>,
    pub chrome_binary: Option<String>,
    /// `false` adds `--no-sandbox`, for containers where Chrome cannot sandbox.
    pub sandbox: bool,
    pub settle_timeout_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            webdriver_binary: "chromedriver".into(),
            webdriver_url: None,
            chrome_binary: None,
            sandbox: true,
            settle_timeout_ms: 10_000,
            settle_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub app_name: String,
    pub format: LogFormat,
    pub log_dir: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            app_name: "precis".into(),
            format: LogFormat::Text,
            log_dir: None,
            level: "info".into(),
        }
    }
}

impl PrecisConfig {
    /// Reject settings that would only fail later, mid-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.llm.api_key.trim();
        if key.is_empty() {
            return Err(ConfigError::Message(format!(
                "no API key configured; set {API_KEY_ENV} or llm.api_key"
            )));
        }
        if key.contains("${") {
            return Err(ConfigError::Message(format!(
                "llm.api_key references an unset variable: {key}"
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Message("llm.model is empty".into()));
        }
        if let Some(t) = self.llm.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Message(format!(
                    "llm.temperature must be between 0 and 2, got {t}"
                )));
            }
        }
        if self.llm.max_body_chars == Some(0) {
            return Err(ConfigError::Message(
                "llm.max_body_chars must be positive".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "fetch.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/precis/precis.yaml`, when a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("precis").join("precis.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PrecisConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PrecisConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecisConfigLoader {
    /// Start with `PRECIS__` env overrides only.
    ///
    /// ```
    /// use precis_config::PrecisConfigLoader;
    ///
    /// let config = PrecisConfigLoader::new()
    ///     .with_yaml_str("llm:\n  api_key: sk-inline\n  model: gpt-4o")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.llm.model, "gpt-4o");
    /// assert_eq!(config.fetch.user_agent, "Mozilla/5.0");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use precis_config::PrecisConfigLoader;
    ///
    /// let cfg = PrecisConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   api_key: "example"
    /// browser:
    ///   sandbox: false
    ///   settle_delay_ms: 250
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!cfg.browser.sandbox);
    /// assert_eq!(cfg.browser.settle_delay_ms, 250);
    /// assert_eq!(cfg.browser.webdriver_binary, "chromedriver");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are applied last, then `${VAR}` placeholders are
    /// expanded. The result is not validated; call [`PrecisConfig::validate`].
    ///
    /// ```
    /// use precis_config::PrecisConfigLoader;
    ///
    /// temp_env::with_var("SUMMARY_KEY", Some("injected-from-env"), || {
    ///     let config = PrecisConfigLoader::new()
    ///         .with_yaml_str("llm:\n  api_key: \"${SUMMARY_KEY}\"")
    ///         .load()
    ///         .expect("valid configuration");
    ///
    ///     assert_eq!(config.llm.api_key, "injected-from-env");
    ///     assert_eq!(config.llm.endpoint, "https://api.openai.com/v1");
    /// });
    /// ```
    pub fn load(self) -> Result<PrecisConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("PRECIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: PrecisConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
