//! Page acquisition and extraction.
//!
//! - Page sources (`source`): direct HTTP fetch or headless browser render,
//!   behind the [`source::PageSource`] trait
//! - HTML to (title, body) extraction (`extract`)

pub mod extract;
pub mod source;

pub use extract::extract;
pub use source::{DirectFetch, Fetcher, HeadlessRender, PageSource};
