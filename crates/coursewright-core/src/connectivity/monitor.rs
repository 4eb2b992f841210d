//! Network reachability signal.
//!
//! `ConnectivityMonitor` holds the current online/offline state and lets
//! listeners observe transitions. It never polls: whatever hosts the client
//! (the CLI, a test) feeds environment events in through [`set_online`].
//!
//! [`set_online`]: ConnectivityMonitor::set_online

use std::sync::Arc;

use tokio::sync::watch;

/// Event-driven online/offline signal.
///
/// Cloning produces a shared view of the same signal.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    sender: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    /// Create a monitor seeded with the environment's reachability at startup.
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Record an environment online/offline event.
    ///
    /// Returns `true` when this was a transition. Repeating the current
    /// value does not wake subscribers.
    pub fn set_online(&self, online: bool) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    /// Subscribe to transitions. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
