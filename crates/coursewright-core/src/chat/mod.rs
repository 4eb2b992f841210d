//! Conversation state and the session manager that drives it.
//!
//! `ConversationStore` holds the log, metadata, and error slot;
//! `SessionManager` is the only thing that mutates it.

pub mod session;
pub mod store;

pub use session::SessionManager;
pub use store::ConversationStore;
