//! Synthesis conversation transcript.
//!
//! An append-only ordered sequence of messages exchanged with the config
//! synthesizer across retry attempts within a single call. Scoped to one
//! call and discarded after; the executor threads it by value through each
//! attempt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MessageRole
// ---------------------------------------------------------------------------

/// Role of a message in the synthesis conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in the synthesis conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Append-only message sequence for one call's synthesis conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message with the given role.
    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Append a user-role message (error feedback for the synthesizer).
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(MessageRole::User, content);
    }

    /// Append an assistant-role message (the synthesizer's reply).
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(MessageRole::Assistant, content);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether any message contains the given text. Used to append one-shot
    /// guidance (e.g. the mapping-language guide) at most once per call.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.content.contains(needle))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("first error");
        transcript.push_assistant("suggested config");
        transcript.push_user("second error");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[0].role, MessageRole::User);
        assert_eq!(transcript.messages()[1].role, MessageRole::Assistant);
        assert_eq!(transcript.messages()[2].content, "second error");
    }

    #[test]
    fn test_contains_text() {
        let mut transcript = Transcript::new();
        transcript.push_user("HTTP 404 from /v2/orders");
        assert!(transcript.contains_text("404"));
        assert!(!transcript.contains_text("timeout"));
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("robot".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_transcript_serde() {
        let mut transcript = Transcript::new();
        transcript.push_user("err");
        let json = serde_json::to_string(&transcript).unwrap();
        let parsed: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.messages()[0].content, "err");
    }
}
