use crate::prompt::SummaryRequest;
use crate::traits::LlmClient;
use precis_common::Result;
use std::sync::Arc;

/// Answer from the completion service, passed straight to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
    /// Model that answered, when the service reports it.
    pub model: Option<String>,
}

/// Sends summary requests through an injected [`LlmClient`].
#[derive(Clone)]
pub struct SummaryClient {
    llm: Arc<dyn LlmClient + Send + Sync>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl SummaryClient {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            llm,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_sampling(mut self, max_tokens: Option<u32>, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// One request, one answer. Empty answers are returned as-is.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult> {
        tracing::info!(
            model = %self.llm.model_name(),
            prompt_chars = request.user_prompt.len(),
            "summary.request"
        );
        let messages = request.messages();
        let response = self
            .llm
            .chat(&messages, self.max_tokens, self.temperature)
            .await?;

        if response.text.is_empty() {
            tracing::warn!(model = ?response.model, "summary.response.empty");
        }
        tracing::info!(
            model = ?response.model,
            chars = response.text.len(),
            tokens = ?response.tokens_used,
            "summary.response"
        );

        Ok(SummaryResult {
            text: response.text,
            model: response.model,
        })
    }
}
