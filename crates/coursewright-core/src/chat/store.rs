//! In-memory conversation state.
//!
//! `ConversationStore` is a plain container owned by the session manager:
//! the append-only message log, the latest progress metadata, and a single
//! error slot. The session identity lives with the manager, not here.

use chrono::Utc;

use coursewright_types::chat::{ConversationMetadata, Message, MetadataDelta};

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    metadata: Option<ConversationMetadata>,
    error: Option<String>,
    last_local_id: i64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append to the log. Entries are never edited or removed afterwards.
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Allocate an id for a locally created message.
    ///
    /// Ids are millisecond timestamps, bumped when two messages land in the
    /// same millisecond so they stay unique and increasing.
    pub fn next_local_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_local_id = now.max(self.last_local_id + 1);
        self.last_local_id
    }

    pub fn metadata(&self) -> Option<&ConversationMetadata> {
        self.metadata.as_ref()
    }

    /// Replace metadata wholesale (session creation).
    pub fn replace_metadata(&mut self, metadata: ConversationMetadata) {
        self.metadata = Some(metadata);
    }

    /// Shallow-merge a server delta into the current metadata.
    pub fn merge_metadata(&mut self, delta: &MetadataDelta) -> &ConversationMetadata {
        let merged = self.metadata.clone().unwrap_or_default().merged(delta);
        self.metadata.insert(merged)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Clear the error slot, returning what was there.
    pub fn clear_error(&mut self) -> Option<String> {
        self.error.take()
    }
}
