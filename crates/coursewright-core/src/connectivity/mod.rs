//! Online/offline tracking feeding the send gate.

pub mod monitor;

pub use monitor::ConnectivityMonitor;
