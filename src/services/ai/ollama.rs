use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{chat_turns, non_empty_reply, ChatTurn, LlmProvider, Message};

const TEMPERATURE: f32 = 0.4;

/// Local models served by Ollama's `/api/chat`, non-streaming.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: chat_turns(system_prompt, messages),
            stream: false,
            options: ChatOptions {
                temperature: TEMPERATURE,
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to reach Ollama at {}", self.endpoint))?;

        let status = resp.status();
        let data: ChatResponse = resp
            .json()
            .await
            .with_context(|| format!("unreadable Ollama response ({status})"))?;

        if let Some(error) = data.error {
            anyhow::bail!("Ollama error ({status}) for model {}: {error}", self.model);
        }
        if !status.is_success() {
            anyhow::bail!("Ollama returned {status}");
        }

        non_empty_reply(data.message.as_ref().map(|m| m.content.as_str()), "Ollama")
    }
}
