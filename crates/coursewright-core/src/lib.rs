//! Session lifecycle and export logic for coursewright.
//!
//! This crate defines the ports (`SessionClient`, `DownloadSink`) that the
//! infrastructure layer implements, plus the state machines built on them.
//! It depends only on `coursewright-types` and never on
//! `coursewright-infra` or any HTTP crate.

pub mod chat;
pub mod client;
pub mod connectivity;
pub mod event;
pub mod export;
