pub mod ollama;
pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Wire shape shared by the chat backends: system prompt first, then the turns.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct ChatTurn<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

pub(crate) fn chat_turns<'a>(system_prompt: &'a str, messages: &'a [Message]) -> Vec<ChatTurn<'a>> {
    std::iter::once(ChatTurn {
        role: "system",
        content: system_prompt,
    })
    .chain(messages.iter().map(|m| ChatTurn {
        role: &m.role,
        content: &m.content,
    }))
    .collect()
}

/// Trims a backend reply; blank text counts as no answer.
pub(crate) fn non_empty_reply(raw: Option<&str>, backend: &str) -> anyhow::Result<String> {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => anyhow::bail!("empty content in {backend} response"),
        None => anyhow::bail!("missing content in {backend} response"),
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_turns_put_system_prompt_first() {
        let history = [Message::user("wifi?"), Message::assistant("Password: ospite")];
        let turns = chat_turns("Sei il concierge.", &history);

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], ChatTurn { role: "system", content: "Sei il concierge." });
        assert_eq!(turns[2].role, "assistant");
        assert_eq!(turns[2].content, "Password: ospite");
    }

    #[test]
    fn test_blank_reply_is_rejected() {
        assert_eq!(non_empty_reply(Some("  Certo! \n"), "test").unwrap(), "Certo!");
        assert!(non_empty_reply(Some("   "), "test").unwrap_err().to_string().contains("empty"));
        assert!(non_empty_reply(None, "test").unwrap_err().to_string().contains("missing"));
    }
}
