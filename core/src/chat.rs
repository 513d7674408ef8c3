//! The language model capability used by answer synthesis.
//!
//! This workspace treats the chat model purely as a `messages -> text`
//! capability; streaming, tool calling, and reasoning traces are out of
//! scope (the full surface lives upstream in the teacher's `llm` module,
//! which this crate does not carry forward).

use std::future::Future;

/// A single turn in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who authored this turn.
    pub role: ChatRole,
    /// The turn's text content.
    pub content: String,
}

impl ChatMessage {
    /// Builds a user-authored turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Builds a system-authored turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// The author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Instructions given ahead of the conversation.
    System,
    /// The end user.
    User,
    /// A prior model response.
    Assistant,
}

/// Produces a text completion from a sequence of messages.
///
/// Implementations are the external LLM provider collaborator named in the
/// component design; this crate ships no implementation, only the trait.
pub trait ChatModel: Send + Sync {
    /// Generates a single text response to the given conversation.
    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = crate::Result<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    impl ChatModel for EchoModel {
        async fn chat(&self, messages: &[ChatMessage]) -> crate::Result<String> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn echoes_last_message() {
        let model = EchoModel;
        let messages = [ChatMessage::system("be terse"), ChatMessage::user("hi")];
        assert_eq!(model.chat(&messages).await.unwrap(), "hi");
    }
}
