//! Page sources: where raw HTML comes from.
//!
//! [`DirectFetch`] issues one HTTP GET; [`HeadlessRender`] loads the page in a
//! throwaway headless browser. [`Fetcher`] holds one of each and picks per
//! call from the caller's [`RenderMode`].

use crate::extract::extract;
use async_trait::async_trait;
use precis_common::{PageContent, PrecisError, RenderMode, Result};
use precis_drivers::browser::{BrowserLauncher, BrowserSession, ChromeLauncher};
use precis_http::{HttpClient, RequestOpts};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Browser-like User-Agent sent by [`DirectFetch`] unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Something that can turn a URL into raw HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn mode(&self) -> RenderMode;

    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Plain HTTP GET.
#[derive(Clone)]
pub struct DirectFetch {
    client: HttpClient,
}

impl DirectFetch {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::detached()
            .and_then(|c| c.with_user_agent(user_agent))
            .map_err(|e| PrecisError::Config(format!("page fetch client: {e}")))?
            .with_timeout(timeout);
        Ok(Self { client })
    }

    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for DirectFetch {
    fn mode(&self) -> RenderMode {
        RenderMode::DirectFetch
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        info!(target: "fetch.direct", %url, "fetch.direct.start");
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        let resp = self
            .client
            .get_text(url.as_str(), opts)
            .await
            .map_err(|e| PrecisError::fetch(url.as_str(), e))?;
        info!(
            target: "fetch.direct",
            %url,
            final_url = %resp.url,
            status = %resp.status,
            content_type = ?resp.content_type,
            bytes = resp.body.len(),
            "fetch.direct.done"
        );
        Ok(resp.body)
    }
}

/// Render in a headless browser so script-built content is present.
///
/// Every fetch launches its own browser and closes it before returning,
/// whether or not navigation and capture succeeded.
pub struct HeadlessRender<L = ChromeLauncher> {
    launcher: L,
}

impl<L: BrowserLauncher> HeadlessRender<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }
}

async fn render(session: &mut dyn BrowserSession, url: &Url) -> anyhow::Result<String> {
    session.goto(url.as_str()).await?;
    session.wait_until_settled().await?;
    session.page_source().await
}

#[async_trait]
impl<L: BrowserLauncher> PageSource for HeadlessRender<L> {
    fn mode(&self) -> RenderMode {
        RenderMode::HeadlessRender
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        info!(target: "fetch.headless", %url, "fetch.headless.start");
        let mut session = self
            .launcher
            .launch()
            .await
            .map_err(|e| PrecisError::fetch(url.as_str(), format!("browser launch failed: {e:#}")))?;

        let captured = render(session.as_mut(), url).await;

        if let Err(e) = session.close().await {
            warn!(target: "fetch.headless", %url, error = %format!("{e:#}"), "browser close failed");
        }

        let html = captured.map_err(|e| PrecisError::fetch(url.as_str(), format!("{e:#}")))?;
        info!(target: "fetch.headless", %url, bytes = html.len(), "fetch.headless.done");
        Ok(html)
    }
}

/// Parse a user-supplied URL. Only `http` and `https` are fetchable.
pub fn parse_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PrecisError::fetch(raw, "URL is empty"));
    }
    let url = Url::parse(trimmed).map_err(|e| PrecisError::fetch(trimmed, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PrecisError::fetch(
            trimmed,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

/// Both page sources, selected per call.
#[derive(Clone)]
pub struct Fetcher {
    direct: Arc<dyn PageSource>,
    headless: Arc<dyn PageSource>,
}

impl Fetcher {
    pub fn new(direct: impl PageSource + 'static, headless: impl PageSource + 'static) -> Self {
        Self {
            direct: Arc::new(direct),
            headless: Arc::new(headless),
        }
    }

    pub fn source(&self, mode: RenderMode) -> &dyn PageSource {
        match mode {
            RenderMode::DirectFetch => self.direct.as_ref(),
            RenderMode::HeadlessRender => self.headless.as_ref(),
        }
    }

    /// Raw HTML for `url` using the requested strategy.
    pub async fn fetch(&self, url: &str, mode: RenderMode) -> Result<String> {
        let url = parse_url(url)?;
        self.source(mode).fetch(&url).await
    }

    /// Fetch and extract in one step.
    pub async fn read(&self, url: &str, mode: RenderMode) -> Result<PageContent> {
        let parsed = parse_url(url)?;
        let html = self.source(mode).fetch(&parsed).await?;
        Ok(extract(&html, parsed.as_str()))
    }
}
