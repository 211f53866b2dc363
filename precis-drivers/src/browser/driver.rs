use crate::browser::{
    options::{build_chrome_arguments, BrowserOptions},
    process::DriverProcess,
    BrowserLauncher, BrowserSession,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use webdriver::capabilities::Capabilities;

const READY_STATE_SCRIPT: &str = "return document.readyState;";
const READY_STATE_POLL: Duration = Duration::from_millis(100);

/// Launches a fresh Chrome for every session.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    options: BrowserOptions,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let driver = PrecisDriver::launch(&self.options).await?;
        Ok(Box::new(driver))
    }
}

/// A `fantoccini` WebDriver session plus everything it owns: the
/// chromedriver process (when we spawned it) and a throwaway profile dir.
pub struct PrecisDriver {
    client: Option<Client>,
    process: Option<DriverProcess>,
    profile_dir: Option<TempDir>,
    settle_timeout: Duration,
    settle_delay: Duration,
}

impl PrecisDriver {
    /// Start chromedriver (or reuse `webdriver_url`) and open a headless session.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let (endpoint, process, profile_dir) = match &options.webdriver_url {
            Some(url) => (url.clone(), None, None),
            None => {
                let profile_dir = tempfile::Builder::new()
                    .prefix("precis-chrome-")
                    .tempdir()
                    .context("failed to create browser profile directory")?;
                let process =
                    DriverProcess::spawn(&options.webdriver_binary, options.launch_timeout).await?;
                (process.endpoint(), Some(process), Some(profile_dir))
            }
        };

        let caps = chrome_capabilities(options, profile_dir.as_ref().map(TempDir::path));

        // On failure `process` drops here and the driver is killed.
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&endpoint)
            .await
            .with_context(|| format!("failed to open WebDriver session at {endpoint}"))?;

        info!(
            target: "browser.session",
            %endpoint,
            pid = ?process.as_ref().and_then(DriverProcess::pid),
            "browser session opened"
        );

        Ok(Self {
            client: Some(client),
            process,
            profile_dir,
            settle_timeout: options.settle_timeout,
            settle_delay: options.settle_delay,
        })
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow!("browser session already closed"))
    }
}

#[async_trait]
impl BrowserSession for PrecisDriver {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.client()?
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))
    }

    async fn wait_until_settled(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.settle_timeout;
        loop {
            let state = self
                .client()?
                .execute(READY_STATE_SCRIPT, vec![])
                .await
                .context("failed to read document.readyState")?;
            if state == Value::String("complete".into()) {
                break;
            }
            if Instant::now() >= deadline {
                warn!(
                    target: "browser.session",
                    ?state,
                    timeout_ms = self.settle_timeout.as_millis() as u64,
                    "page did not report complete; capturing anyway"
                );
                break;
            }
            sleep(READY_STATE_POLL).await;
        }
        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.client()?
            .source()
            .await
            .context("failed to capture page source")
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        let session = match self.client.take() {
            Some(client) => client.close().await.map_err(anyhow::Error::from),
            None => Ok(()),
        };
        if let Err(e) = &session {
            warn!(target: "browser.session", error = %e, "closing WebDriver session failed");
        }
        let process = match self.process.take() {
            Some(process) => process.shutdown().await,
            None => Ok(()),
        };
        self.profile_dir.take();
        debug!(target: "browser.session", "browser session closed");
        session.and(process)
    }
}

impl Drop for PrecisDriver {
    fn drop(&mut self) {
        if self.client.is_some() {
            warn!(
                target: "browser.session",
                "browser session dropped without close; killing driver process"
            );
        }
    }
}

/// W3C capabilities for a headless Chrome session.
pub fn chrome_capabilities(options: &BrowserOptions, profile_dir: Option<&Path>) -> Capabilities {
    let mut chrome_opts = serde_json::Map::new();
    chrome_opts.insert(
        "args".to_string(),
        json!(build_chrome_arguments(options, profile_dir)),
    );
    if let Some(binary) = &options.chrome_binary {
        chrome_opts.insert("binary".to_string(), json!(binary));
    }

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome_opts));
    caps
}
