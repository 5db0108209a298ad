//! Narrative provider selection and the OpenAI chat-completions backend.
//!
//! | Config value | Provider |
//! |--------------|----------|
//! | `"template"` | [`TemplateProvider`] (offline, deterministic) |
//! | `"openai"` | [`OpenAIProvider`] |
//! | `"disabled"` | [`DisabledProvider`] (every call fails) |
//!
//! # Retry Strategy
//!
//! The OpenAI provider uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use msme_core::narrative::{DisabledProvider, NarrativePrompt, NarrativeProvider, TemplateProvider};

use crate::config::NarrativeConfig;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Narrative provider using the OpenAI chat completions API.
///
/// Requires the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: &NarrativeConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("narrative.model required for OpenAI provider"))?;

        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            api_key,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl NarrativeProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(OPENAI_CHAT_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_chat_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::debug!(%status, attempt, "openai narrative retryable error");
                        last_err = Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Narrative generation failed after retries")))
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}

/// Create the narrative provider named by `config.provider`.
pub fn create_provider(config: &NarrativeConfig) -> Result<Arc<dyn NarrativeProvider>> {
    match config.provider.as_str() {
        "template" => Ok(Arc::new(TemplateProvider)),
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
        other => bail!("Unknown narrative provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_template_and_disabled() {
        let mut cfg = NarrativeConfig::default();
        assert_eq!(create_provider(&cfg).unwrap().name(), "template");
        cfg.provider = "disabled".to_string();
        assert_eq!(create_provider(&cfg).unwrap().name(), "disabled");
        cfg.provider = "praison".to_string();
        assert!(create_provider(&cfg).is_err());
    }

    #[test]
    fn test_openai_requires_model() {
        let cfg = NarrativeConfig {
            provider: "openai".to_string(),
            ..NarrativeConfig::default()
        };
        let err = create_provider(&cfg).err().unwrap();
        assert!(err.to_string().contains("narrative.model"));
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Textile exports grew." } }]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Textile exports grew.");
        assert!(parse_chat_response(&serde_json::json!({ "choices": [] })).is_err());
    }
}
