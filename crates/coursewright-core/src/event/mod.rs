//! Event bus for session observers.
//!
//! `EventBus` carries the session manager's narration to the terminal
//! renderer and to tests.

pub mod bus;

pub use bus::EventBus;
