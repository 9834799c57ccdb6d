//! Chat prompt construction for the reply generator

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};

/// Builds the two-message chat: the length-limiting system instruction followed
/// by the caller's text as the sole user message.
#[must_use]
pub fn build_reply_prompt(system_prompt: &str, user_text: &str) -> Vec<ChatCompletionMessage> {
    vec![
        ChatCompletionMessage {
            role: MessageRole::system,
            content: Content::Text(system_prompt.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
        ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(user_text.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
    ]
}
