use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Launch options for a headless Chrome session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// chromedriver executable, resolved through `PATH` when relative.
    pub webdriver_binary: String,
    /// Existing WebDriver endpoint. When set no driver process is spawned.
    pub webdriver_url: Option<String>,
    /// Chrome/Chromium executable; chromedriver's default when `None`.
    pub chrome_binary: Option<String>,
    /// Keep Chrome's sandbox on. Turn off only where Chrome cannot create
    /// its sandbox, such as unprivileged containers.
    pub sandbox: bool,
    /// Upper bound on waiting for `document.readyState == "complete"`.
    pub settle_timeout: Duration,
    /// Extra fixed pause after the document reports complete.
    pub settle_delay: Duration,
    /// How long chromedriver may take to accept connections.
    pub launch_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_binary: "chromedriver".to_string(),
            webdriver_url: None,
            chrome_binary: None,
            sandbox: true,
            settle_timeout: Duration::from_secs(10),
            settle_delay: Duration::ZERO,
            launch_timeout: Duration::from_secs(10),
        }
    }
}

/// Construct Chrome command-line arguments for a headless render.
pub fn build_chrome_arguments(options: &BrowserOptions, profile_dir: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "--headless".to_string(),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--no-first-run".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if !options.sandbox {
        args.push("--no-sandbox".to_string());
    }
    if let Some(dir) = profile_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
    }
    args
}
