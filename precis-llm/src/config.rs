use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub endpoint: String,
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Ask the service to confirm the key and model before serving.
    pub verify_on_startup: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmSettings {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: crate::DEFAULT_OPENAI_MODEL.to_string(),
            endpoint: crate::openai::OPENAI_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
            verify_on_startup: false,
            max_tokens: None,
            temperature: None,
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
