//! Common types and utilities shared across Precis crates.
//!
//! This crate defines the page model, the render-mode switch, observability
//! helpers, and the shared error type used throughout the Precis workspace.
//! It is intentionally lightweight so that every crate can depend on it
//! without pulling in the HTTP or browser stacks.
//!
//! # Overview
//!
//! - [`PageContent`]: the (title, body) pair extracted from one fetched page
//! - [`RenderMode`]: direct HTTP fetch or headless browser render
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PrecisError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use precis_common::{PageContent, RenderMode, NO_TITLE_SENTINEL};
//!
//! let page = PageContent::new("https://example.com", None, "Hello");
//! assert_eq!(page.title(), NO_TITLE_SENTINEL);
//! assert_eq!(RenderMode::from_flag(true), RenderMode::HeadlessRender);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Placeholder title used when a page has no usable `<title>` element.
pub const NO_TITLE_SENTINEL: &str = "No title found";

/// How a page should be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Plain HTTP GET; fine for server-rendered pages.
    #[default]
    DirectFetch,
    /// Load the page in a headless browser so scripts can build the DOM.
    HeadlessRender,
}

impl RenderMode {
    /// Map the "use a browser?" checkbox onto a mode.
    pub fn from_flag(headless: bool) -> Self {
        if headless {
            Self::HeadlessRender
        } else {
            Self::DirectFetch
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectFetch => f.write_str("direct"),
            Self::HeadlessRender => f.write_str("headless"),
        }
    }
}

/// Readable content of a single fetched page.
///
/// Built once per fetch and never mutated. `title` always holds either the
/// page title or [`NO_TITLE_SENTINEL`]; `body` may be empty but is never
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    source_url: String,
    title: String,
    body: String,
}

impl PageContent {
    pub fn new(
        source_url: impl Into<String>,
        title: Option<String>,
        body: impl Into<String>,
    ) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE_SENTINEL.to_string());
        Self {
            source_url: source_url.into(),
            title,
            body: body.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True when the page produced no title and the sentinel is in use.
    pub fn has_sentinel_title(&self) -> bool {
        self.title == NO_TITLE_SENTINEL
    }
}

/// Error types used across the Precis system.
#[derive(thiserror::Error, Debug)]
pub enum PrecisError {
    /// Configuration was incomplete or invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The page could not be retrieved.
    #[error("Failed to fetch {url}: {cause}")]
    Fetch { url: String, cause: String },

    /// Content extraction failed; not expected with a permissive parser.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The completion service failed or returned an unusable response.
    #[error("Summary error: {0}")]
    Summary(String),
}

impl PrecisError {
    pub fn fetch(url: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    /// Whether the process should stop rather than accept another request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Convenient alias for results that use [`PrecisError`].
pub type Result<T> = std::result::Result<T, PrecisError>;
