//! Driver layer for headless browser rendering.
//!
//! This crate owns the browser process lifecycle used to materialise
//! script-generated pages before extraction.
//!
//! - [`browser::BrowserLauncher`] / [`browser::BrowserSession`]: the seam the
//!   fetch layer renders through
//! - [`browser::driver::ChromeLauncher`]: spawns chromedriver and opens a
//!   `fantoccini` WebDriver session
//! - [`browser::process::DriverProcess`]: the chromedriver child, killed on drop
//! - [`browser::options`]: launch options and Chrome command-line arguments
pub mod browser;
