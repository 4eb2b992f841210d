//! Session event fan-out.
//!
//! The manager narrates every state change here: phase flips, appended
//! messages, progress merges, error banner changes and announcements. A
//! renderer subscribes before `initialize()` so it sees the welcome message.
//! Nothing is buffered for subscribers that join later.

use coursewright_types::event::{Announcement, SessionEvent};
use tokio::sync::broadcast;

/// Capacity used when no config is at hand (tests, embedding).
const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel of [`SessionEvent`]s owned by one session manager.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    ///
    /// A receiver that falls more than `capacity` events behind gets
    /// `Lagged` once and then resumes with the oldest retained event.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Deliver to current subscribers. Without any, the event is dropped.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn announce(&self, announcement: Announcement) {
        self.publish(SessionEvent::Announcement { announcement });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursewright_types::chat::{ConversationMetadata, Message};
    use tokio::sync::broadcast::error::TryRecvError;

    fn error_changed(text: &str) -> SessionEvent {
        SessionEvent::ErrorChanged {
            error: Some(text.to_string()),
        }
    }

    #[test]
    fn send_narration_arrives_in_publish_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SessionEvent::MessageAppended {
            message: Message::user(1, "A course on Rust"),
        });
        bus.publish(SessionEvent::MetadataUpdated {
            metadata: ConversationMetadata::default(),
        });
        bus.announce(Announcement::AssistantResponded);

        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::MessageAppended { .. })
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::MetadataUpdated { .. })
        ));
        match rx.try_recv() {
            Ok(SessionEvent::Announcement { announcement }) => {
                assert_eq!(announcement, Announcement::AssistantResponded)
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(16);
        bus.announce(Announcement::ConnectionLost);

        let mut rx = bus.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        bus.announce(Announcement::ConnectionRestored);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn every_subscriber_sees_the_banner() {
        let bus = EventBus::new(16);
        let mut renderer = bus.subscribe();
        let mut recorder = bus.subscribe();

        bus.publish(error_changed("rate limited"));

        for rx in [&mut renderer, &mut recorder] {
            match rx.try_recv() {
                Ok(SessionEvent::ErrorChanged { error }) => {
                    assert_eq!(error.as_deref(), Some("rate limited"))
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn publishing_without_listeners_is_dropped() {
        let bus = EventBus::default();
        bus.publish(error_changed("offline"));

        let mut rx = bus.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn slow_renderer_skips_ahead_to_newest_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        for n in 0..10 {
            bus.publish(error_changed(&format!("failure {n}")));
        }

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(6))));
        match rx.try_recv() {
            Ok(SessionEvent::ErrorChanged { error }) => {
                assert_eq!(error.as_deref(), Some("failure 6"))
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
