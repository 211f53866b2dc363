use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use precis_common::observability::LogConfig;
use precis_config::PrecisConfig;
use precis_drivers::browser::{BrowserOptions, ChromeLauncher};
use precis_llm::config::LlmSettings;
use precis_llm::traits::LlmClient;
use precis_llm::{SummaryClient, SummaryRequestBuilder, ensure_llm_ready};
use precis_web::{DirectFetch, Fetcher, HeadlessRender};
use std::sync::Arc;
use std::time::Duration;

pub fn log_config(cfg: &PrecisConfig, emit_stderr: bool) -> LogConfig {
    LogConfig {
        app_name: cfg.logging.app_name.clone(),
        log_dir: cfg.logging.log_dir.clone(),
        emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.level.clone(),
    }
}

pub fn llm_settings(cfg: &PrecisConfig) -> LlmSettings {
    LlmSettings {
        api_key: cfg.llm.api_key.clone(),
        model: cfg.llm.model.clone(),
        endpoint: cfg.llm.endpoint.clone(),
        timeout: Duration::from_secs(cfg.llm.timeout_secs),
        verify_on_startup: cfg.llm.verify,
        max_tokens: cfg.llm.max_tokens,
        temperature: cfg.llm.temperature,
    }
}

pub fn browser_options(cfg: &PrecisConfig) -> BrowserOptions {
    BrowserOptions {
        webdriver_binary: cfg.browser.webdriver_binary.clone(),
        webdriver_url: cfg.browser.webdriver_url.clone(),
        chrome_binary: cfg.browser.chrome_binary.clone(),
        sandbox: cfg.browser.sandbox,
        settle_timeout: Duration::from_millis(cfg.browser.settle_timeout_ms),
        settle_delay: Duration::from_millis(cfg.browser.settle_delay_ms),
        ..BrowserOptions::default()
    }
}

pub async fn build_llm_client(cfg: &PrecisConfig) -> Result<Arc<dyn LlmClient + Send + Sync>> {
    let client = ensure_llm_ready(&llm_settings(cfg))
        .await
        .context("completion service is not usable")?;
    Ok(client)
}

pub fn build_fetcher(cfg: &PrecisConfig) -> Result<Fetcher> {
    let direct = DirectFetch::new(
        &cfg.fetch.user_agent,
        Duration::from_secs(cfg.fetch.timeout_secs),
    )
    .context("building HTTP client")?;
    let headless = HeadlessRender::new(ChromeLauncher::new(browser_options(cfg)));
    Ok(Fetcher::new(direct, headless))
}

/// Wire every component from loaded, validated config.
pub async fn build_from_config(cfg: &PrecisConfig) -> Result<Pipeline> {
    let llm = build_llm_client(cfg).await?;
    let summary = SummaryClient::new(llm).with_sampling(cfg.llm.max_tokens, cfg.llm.temperature);
    let fetcher = build_fetcher(cfg)?;
    Ok(Pipeline::new(
        fetcher,
        SummaryRequestBuilder::new(cfg.llm.max_body_chars),
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use precis_config::PrecisConfigLoader;

    fn config(yaml: &str) -> PrecisConfig {
        PrecisConfigLoader::new().with_yaml_str(yaml).load().unwrap()
    }

    #[test]
    fn sections_map_onto_components() {
        let cfg = config(
            r#"
llm:
  api_key: sk-test
  model: gpt-4o
  timeout_secs: 5
  max_body_chars: 2000
browser:
  webdriver_url: http://127.0.0.1:9515
  sandbox: false
  settle_timeout_ms: 1500
  settle_delay_ms: 200
logging:
  app_name: precis-test
  level: debug
"#,
        );

        let llm = llm_settings(&cfg);
        assert_eq!(llm.api_key, "sk-test");
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.timeout, Duration::from_secs(5));

        let browser = browser_options(&cfg);
        assert_eq!(browser.webdriver_url.as_deref(), Some("http://127.0.0.1:9515"));
        assert!(!browser.sandbox);
        assert_eq!(browser.settle_timeout, Duration::from_millis(1500));
        assert_eq!(browser.settle_delay, Duration::from_millis(200));

        let log = log_config(&cfg, true);
        assert_eq!(log.app_name, "precis-test");
        assert_eq!(log.default_filter, "debug");
        assert!(log.emit_stderr);
    }

    #[tokio::test]
    async fn pipeline_builds_without_network() {
        let cfg = config("llm:\n  api_key: sk-test");
        assert!(build_from_config(&cfg).await.is_ok());
    }

    #[tokio::test]
    async fn unusable_key_fails_startup() {
        let mut cfg = config("llm:\n  api_key: placeholder");
        cfg.llm.api_key = "sk-\u{7f}".into();
        let err = build_from_config(&cfg).await.err().unwrap();
        assert!(format!("{err:#}").contains("completion service is not usable"));
    }
}
