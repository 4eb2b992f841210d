//! Event types for the session event bus.
//!
//! `SessionEvent` is broadcast by the session manager whenever observable
//! state changes. Renderers and screen-reader narration subscribe to it
//! instead of polling the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chat::{ConversationMetadata, ManagerPhase, Message};

/// Maximum number of characters of a safety notice repeated in its announcement.
pub const SAFETY_EXCERPT_CHARS: usize = 100;

/// Events emitted by the session manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The manager moved to a new lifecycle phase.
    PhaseChanged { phase: ManagerPhase },

    /// A message was appended to the log.
    MessageAppended { message: Message },

    /// Conversation progress was replaced after a merge.
    MetadataUpdated { metadata: ConversationMetadata },

    /// The error banner changed (`None` when cleared).
    ErrorChanged { error: Option<String> },

    /// Something worth narrating happened.
    Announcement { announcement: Announcement },
}

/// Moments that warrant a screen-reader announcement.
///
/// The `Display` impl gives default wording; presentation layers are free
/// to phrase them differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Announcement {
    /// A safety-blocked reply arrived; carries the leading excerpt.
    SafetyNotice(String),
    AssistantResponded,
    /// The service rejected a message.
    Error(String),
    /// The transport failed mid-send.
    ConnectionError,
    ConnectionLost,
    ConnectionRestored,
}

impl Announcement {
    /// Build a safety notice announcement from the full reply text.
    pub fn safety_notice(content: &str) -> Self {
        Announcement::SafetyNotice(content.chars().take(SAFETY_EXCERPT_CHARS).collect())
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::SafetyNotice(excerpt) => write!(f, "Safety notice: {excerpt}"),
            Announcement::AssistantResponded => write!(f, "Assistant responded"),
            Announcement::Error(text) => write!(f, "Error: {text}"),
            Announcement::ConnectionError => write!(f, "Connection error occurred"),
            Announcement::ConnectionLost => write!(f, "Connection lost"),
            Announcement::ConnectionRestored => write!(f, "Connection restored"),
        }
    }
}
