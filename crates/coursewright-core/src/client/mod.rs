//! Transport port for the conversation service.

pub mod box_client;
pub mod session_client;

pub use box_client::BoxSessionClient;
pub use session_client::SessionClient;
