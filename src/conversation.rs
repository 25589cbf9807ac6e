//! Conversion of stored conversation history into provider-ready messages.

use crate::{Message, Role, Turn};

/// Map stored turns onto `{role, content}` pairs.
///
/// `assistant` stays `assistant`; every other stored role becomes `user`.
/// Provider attribution is dropped.
pub fn normalize(history: &[Turn]) -> Vec<Message> {
    history
        .iter()
        .map(|turn| {
            let role = if turn.role == "assistant" {
                Role::Assistant
            } else {
                Role::User
            };
            Message::new(role, turn.content.clone())
        })
        .collect()
}

/// Normalized history followed by the new user message.
pub fn build_messages(history: &[Turn], user_message: &str) -> Vec<Message> {
    let mut messages = normalize(history);
    messages.push(Message::user(user_message));
    messages
}
