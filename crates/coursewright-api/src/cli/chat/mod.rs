//! Interactive CLI chat experience for coursewright.
//!
//! Implements the conversation loop: welcome banner, progress line, a
//! spinner while a message is in flight, slash commands, and rendering of
//! session events. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
