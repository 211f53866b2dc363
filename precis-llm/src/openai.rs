use crate::traits::{ChatMessage, LlmClient, LlmResponse};
use async_trait::async_trait;
use precis_common::{PrecisError, Result};
use precis_http::{sanitize_api_key, Auth, HttpClient, HttpError, RequestOpts};
use precis_http::HttpStatus as StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// Client for the OpenAI chat completions API (and compatible gateways).
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One element in the `choices` array
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
}

impl OpenAiClient {
    /// Create a new client for the given API key and model against the public API.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(api_key, model, OPENAI_API_BASE, Duration::from_secs(60))
    }

    /// Create a client for an OpenAI-compatible endpoint.
    ///
    /// The key is validated here so a malformed credential fails at startup
    /// rather than on the first request.
    pub fn with_endpoint(
        api_key: String,
        model: String,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = sanitize_api_key(&api_key)
            .map_err(|e| PrecisError::Config(format!("OpenAI API key: {e}")))?;
        if model.trim().is_empty() {
            return Err(PrecisError::Config("OpenAI model name is empty".into()));
        }
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let client = HttpClient::new(&base)
            .map_err(|e| PrecisError::Config(format!("OpenAI endpoint {endpoint}: {e}")))?
            .with_timeout(timeout);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "openai.chat.request"
        );

        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature,
        };

        let resp: ChatCompletionResponse = self
            .client
            .post_json("chat/completions", Some(&self.api_key), &req)
            .await
            .map_err(http_to_summary)?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PrecisError::Summary("completion response contained no choices".into()))?;

        if let Some(refusal) = &choice.message.refusal {
            tracing::warn!(model = %self.model, %refusal, "openai.chat.refusal");
        }
        tracing::debug!(
            id = ?resp.id,
            finish_reason = ?choice.finish_reason,
            "openai.chat.response"
        );

        Ok(LlmResponse {
            text: choice.message.content.unwrap_or_default(),
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn verify(&self) -> Result<()> {
        let opts = RequestOpts {
            auth: Some(Auth::Bearer(&self.api_key)),
            timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        };
        let info: ModelInfo = self
            .client
            .get_json(&format!("models/{}", self.model), opts)
            .await
            .map_err(|e| match e.status() {
                Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                    PrecisError::Config(format!("OpenAI rejected the API key: {e}"))
                }
                Some(StatusCode::NOT_FOUND) => {
                    PrecisError::Config(format!("model `{}` is not available: {e}", self.model))
                }
                _ => PrecisError::Config(format!("could not reach the completion service: {e}")),
            })?;
        tracing::info!(model = %info.id, "openai.credentials.verified");
        Ok(())
    }
}

fn http_to_summary(e: HttpError) -> PrecisError {
    PrecisError::Summary(format!("{e}"))
}
