//! Export and summary requests, tracked independently of the chat.

pub mod coordinator;
pub mod filename;
pub mod sink;

pub use coordinator::ExportCoordinator;
pub use sink::DownloadSink;
