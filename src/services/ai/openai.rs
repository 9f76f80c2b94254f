use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{chat_turns, non_empty_reply, LlmProvider, Message};

/// Chat completions against any OpenAI-compatible endpoint.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": chat_turns(system_prompt, messages),
            "temperature": 0.4,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call chat completions API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chat completions response")?;

        if !status.is_success() {
            anyhow::bail!("chat completions API error ({}): {}", status, data);
        }

        non_empty_reply(data["choices"][0]["message"]["content"].as_str(), "chat completions")
    }
}
