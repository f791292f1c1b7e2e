//! Conversation formatting shared by the chat backends
//!
//! Two renderings exist: a messages array for the hosted chat-completions
//! API, and a flat `role: content` prompt for local backends. Both start
//! from the same trimmed history.

use super::ChatMessage;

/// Only the most recent turns participate in a prompt
pub const MAX_HISTORY_TURNS: usize = 10;

/// System prompt for general chat
pub const CHAT_SYSTEM_PROMPT: &str = "You are a friendly and helpful assistant. \
Answer concretely when you can; when you do not know, say so and suggest an alternative.";

/// System prompt for RAG answers, grounding the model in retrieved context
#[must_use]
pub fn rag_system_prompt(context: &str) -> String {
    format!(
        "You are a helpful assistant.\n\
         Answer using the reference information below when it is relevant.\n\
         If the reference information is insufficient, say so and ask for what is missing.\n\n\
         [Reference information]\n{context}"
    )
}

/// Keep the last `MAX_HISTORY_TURNS` valid turns.
///
/// A valid turn has role `user` or `assistant` and non-empty content;
/// anything else came from a buggy client and is skipped.
#[must_use]
pub fn trim_history(history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut trimmed: Vec<ChatMessage> = history
        .iter()
        .filter(|msg| {
            (msg.role == "user" || msg.role == "assistant") && !msg.content.trim().is_empty()
        })
        .rev()
        .take(MAX_HISTORY_TURNS)
        .cloned()
        .collect();
    trimmed.reverse();
    trimmed
}

/// Assemble the full message list: system, trimmed history, current message.
#[must_use]
pub fn build_messages(
    system: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", system));
    messages.extend(trim_history(history));
    messages.push(ChatMessage::new("user", user_message));
    messages
}

/// Render messages as a flat prompt for local backends.
///
/// System content leads bare; other turns become `role: content` lines; a
/// trailing `assistant:` cues the model to answer.
#[must_use]
pub fn render_flat_prompt(messages: &[ChatMessage]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(messages.len() + 1);
    for msg in messages {
        let content = msg.content.trim();
        if content.is_empty() {
            continue;
        }
        if msg.role == "system" {
            parts.push(content.to_string());
        } else {
            parts.push(format!("{}: {}", msg.role, content));
        }
    }
    parts.push("assistant:".to_string());
    parts.join("\n")
}

/// Keep the tail after the last `assistant:` marker.
///
/// Local runtimes echo the prompt back with completions appended; the reply
/// is whatever follows the final cue.
#[must_use]
pub fn extract_assistant_reply(output: &str) -> String {
    match output.rfind("assistant:") {
        Some(idx) => output[idx + "assistant:".len()..].trim().to_string(),
        None => output.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    #[test]
    fn test_trim_history_keeps_last_ten() {
        let history: Vec<ChatMessage> = (0..15)
            .map(|i| turn(if i % 2 == 0 { "user" } else { "assistant" }, &format!("turn {i}")))
            .collect();
        let trimmed = trim_history(&history);
        assert_eq!(trimmed.len(), MAX_HISTORY_TURNS);
        assert_eq!(trimmed[0].content, "turn 5");
        assert_eq!(trimmed[9].content, "turn 14");
    }

    #[test]
    fn test_trim_history_skips_invalid_turns() {
        let history = vec![
            turn("user", "hello"),
            turn("system", "injected"),
            turn("assistant", "   "),
            turn("", "no role"),
            turn("assistant", "hi there"),
        ];
        let trimmed = trim_history(&history);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[0].content, "hello");
        assert_eq!(trimmed[1].content, "hi there");
    }

    #[test]
    fn test_build_messages_shape() {
        let history = vec![turn("user", "first"), turn("assistant", "second")];
        let messages = build_messages(CHAT_SYSTEM_PROMPT, &history, "third");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "third");
    }

    #[test]
    fn test_render_flat_prompt() {
        let messages = vec![
            turn("system", "Be helpful."),
            turn("user", "what is pgvector?"),
            turn("assistant", "a Postgres extension"),
            turn("user", "and the operator?"),
        ];
        let prompt = render_flat_prompt(&messages);
        assert_eq!(
            prompt,
            "Be helpful.\n\
             user: what is pgvector?\n\
             assistant: a Postgres extension\n\
             user: and the operator?\n\
             assistant:"
        );
    }

    #[test]
    fn test_extract_assistant_reply_takes_last_tail() {
        let output = "system stuff\nuser: hi\nassistant: old\nuser: again\nassistant: the answer\n";
        assert_eq!(extract_assistant_reply(output), "the answer");
    }

    #[test]
    fn test_extract_assistant_reply_without_marker() {
        assert_eq!(extract_assistant_reply("  plain reply \n"), "plain reply");
    }

    #[test]
    fn test_rag_system_prompt_embeds_context() {
        let prompt = rag_system_prompt("[Document 1]\nsome content");
        assert!(prompt.contains("[Reference information]"));
        assert!(prompt.contains("some content"));
    }
}
