//! Summarization over a hosted language model.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with an
//! OpenAI chat-completions implementation, the prompt builder for page
//! summaries ([`prompt`]) and the [`summary::SummaryClient`] that ties them
//! together. [`ensure_llm_ready`] builds the client once at startup.
//!
//! # Examples
//! ```no_run
//! use precis_common::Result;
//! use precis_llm::{config::LlmSettings, ensure_llm_ready};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let settings = LlmSettings::openai(std::env::var("OPENAI_API_KEY").unwrap_or_default());
//! let client = ensure_llm_ready(&settings).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod openai;
pub mod prompt;
pub mod summary;
pub mod traits;

use config::LlmSettings;
use openai::OpenAiClient;
use precis_common::Result;
use std::sync::Arc;
use traits::LlmClient;

pub use prompt::{SummaryRequest, SummaryRequestBuilder};
pub use summary::{SummaryClient, SummaryResult};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Build the completion client, failing with a `Config` error when the
/// credentials are unusable.
pub async fn ensure_llm_ready(
    settings: &LlmSettings,
) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    let client = OpenAiClient::with_endpoint(
        settings.api_key.clone(),
        settings.model.clone(),
        &settings.endpoint,
        settings.timeout,
    )?;
    if settings.verify_on_startup {
        client.verify().await?;
    }
    tracing::info!(
        model = %client.model_name(),
        endpoint = %settings.endpoint,
        verified = settings.verify_on_startup,
        "llm.ready"
    );
    Ok(Arc::new(client))
}
