use anyhow::Result;
use async_trait::async_trait;

pub mod driver;
pub mod options;
pub mod process;

pub use driver::{ChromeLauncher, PrecisDriver};
pub use options::BrowserOptions;

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// One live browser instance.
///
/// Callers must finish with [`BrowserSession::close`] on every path.
/// Implementations also release their process when dropped, so a session
/// lost to a panic or a cancelled future does not leak a browser.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the current tab to `url`.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Best-effort wait for scripts to finish building the page.
    async fn wait_until_settled(&mut self) -> Result<()>;

    /// Serialised DOM of the current page.
    async fn page_source(&mut self) -> Result<String>;

    /// End the session and terminate the browser.
    async fn close(self: Box<Self>) -> Result<()>;
}
