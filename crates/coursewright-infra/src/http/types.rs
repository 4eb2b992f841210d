//! Conversation service wire types.
//!
//! Only the request bodies and the error envelope live here. Successful
//! responses deserialize straight into the domain types from
//! `coursewright-types`, which already match the service's JSON.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/conversations/{session_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
}

/// Body the service returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The error text, treating an empty string as absent.
    pub fn into_message(self) -> Option<String> {
        self.error.filter(|message| !message.is_empty())
    }
}
