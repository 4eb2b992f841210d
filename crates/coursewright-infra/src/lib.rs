//! Infrastructure layer for coursewright.
//!
//! Implements the ports defined in `coursewright-core`: the reqwest-backed
//! conversation service client and the filesystem download sink. Also loads
//! `config.toml` from the data directory.

pub mod config;
pub mod download;
pub mod http;
