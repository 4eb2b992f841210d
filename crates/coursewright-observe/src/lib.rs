//! Observability setup for coursewright binaries.

pub mod tracing_setup;
