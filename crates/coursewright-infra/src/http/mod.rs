//! HTTP transport for the conversation service.

pub mod client;
pub mod disposition;
pub mod types;

pub use client::HttpSessionClient;
