//! Shared domain types for coursewright.
//!
//! This crate contains the types used across the client: sessions,
//! messages, conversation progress, exports, session events, configuration,
//! and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod export;

mod serde_util;
