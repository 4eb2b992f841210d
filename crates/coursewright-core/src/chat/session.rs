//! Session manager for the course-design conversation.
//!
//! Owns the single server session, gates and dispatches sends, classifies
//! failures into user-visible text, and reacts to connectivity changes.
//! Every state change is mirrored onto the [`EventBus`] so presentation
//! layers can observe it without polling.
//!
//! Locks are never held across an `.await`. When both are needed they are
//! taken in the order `control` then `store`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use coursewright_types::chat::{
    ConversationMetadata, ManagerPhase, Message, SendBlock, SendOutcome, Session,
};
use coursewright_types::error::ClientError;
use coursewright_types::event::{Announcement, SessionEvent};

use crate::client::BoxSessionClient;
use crate::connectivity::ConnectivityMonitor;
use crate::event::EventBus;

use super::store::ConversationStore;

/// Shown when the transport itself failed.
pub const CONNECTION_ERROR_TEXT: &str =
    "Sorry, I encountered a connection error. Please try again.";

/// Shown when the server rejected a send without saying why.
pub const GENERIC_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Error banner text while the host reports no connectivity.
pub const OFFLINE_NOTICE: &str =
    "You appear to be offline. Please check your internet connection.";

#[derive(Debug)]
struct Control {
    phase: ManagerPhase,
    input: String,
    connection_failures: u32,
}

/// Orchestrates one conversation with the remote service.
///
/// Shared as `Arc<SessionManager>`; all operations take `&self`.
pub struct SessionManager {
    client: Arc<BoxSessionClient>,
    connectivity: ConnectivityMonitor,
    control: Mutex<Control>,
    store: Mutex<ConversationStore>,
    /// Set while a send is dispatched. Checked and set under the control lock.
    in_flight: AtomicBool,
    /// Last connectivity value this manager reacted to.
    last_online: AtomicBool,
    session_tx: watch::Sender<Option<Session>>,
    events: EventBus,
}

impl SessionManager {
    pub fn new(
        client: Arc<BoxSessionClient>,
        connectivity: ConnectivityMonitor,
        events: EventBus,
    ) -> Self {
        let (session_tx, _) = watch::channel(None);
        let online = connectivity.is_online();
        Self {
            client,
            connectivity,
            control: Mutex::new(Control {
                phase: ManagerPhase::Uninitialized,
                input: String::new(),
                connection_failures: 0,
            }),
            store: Mutex::new(ConversationStore::new()),
            in_flight: AtomicBool::new(false),
            last_online: AtomicBool::new(online),
            session_tx,
            events,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> ManagerPhase {
        self.lock_control().phase
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }

    /// Watch the session slot. The export coordinator follows it.
    pub fn session_watch(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_store().messages().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.lock_store().len()
    }

    pub fn metadata(&self) -> Option<ConversationMetadata> {
        self.lock_store().metadata().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.lock_store().error().map(str::to_owned)
    }

    /// Consecutive sends that failed at the transport level.
    pub fn connection_failures(&self) -> u32 {
        self.lock_control().connection_failures
    }

    pub fn input(&self) -> String {
        self.lock_control().input.clone()
    }

    /// Replace the composed-but-unsent input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock_control().input = text.into();
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    // ------------------------------------------------------------------
    // Gating
    // ------------------------------------------------------------------

    /// Whether a send would be dispatched right now.
    pub fn can_send(&self) -> bool {
        self.block_reason(&self.lock_control()).is_none()
    }

    fn block_reason(&self, control: &Control) -> Option<SendBlock> {
        if control.input.trim().is_empty() {
            Some(SendBlock::EmptyInput)
        } else if self.session_tx.borrow().is_none() {
            Some(SendBlock::NoSession)
        } else if self.in_flight.load(Ordering::Acquire) {
            Some(SendBlock::AlreadySending)
        } else if !self.connectivity.is_online() {
            Some(SendBlock::Offline)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create the server session.
    ///
    /// Runs only from `Uninitialized`. A failure is logged and leaves the
    /// manager `Uninitialized` with no user-visible error; the caller may
    /// invoke this again. Returns whether a session was established.
    pub async fn initialize(&self) -> bool {
        {
            let mut control = self.lock_control();
            if control.phase != ManagerPhase::Uninitialized || self.session_tx.borrow().is_some() {
                debug!(phase = ?control.phase, "initialize ignored");
                return false;
            }
            control.phase = ManagerPhase::Initializing;
        }
        self.publish_phase(ManagerPhase::Initializing);

        let span = tracing::info_span!("session.create", request_id = %Uuid::now_v7());
        let result = self.client.create_session().instrument(span).await;

        match result {
            Ok(created) => {
                let session = Session::new(created.session_id);
                let welcome = created.welcome_message;
                let metadata = created.conversation;
                {
                    let mut control = self.lock_control();
                    let mut store = self.lock_store();
                    store.replace_metadata(metadata.clone());
                    store.append_message(welcome.clone());
                    self.session_tx.send_replace(Some(session.clone()));
                    control.phase = ManagerPhase::Ready;
                }
                info!(session_id = %session.id, "session established");
                self.events.publish(SessionEvent::MetadataUpdated { metadata });
                self.events.publish(SessionEvent::MessageAppended { message: welcome });
                self.publish_phase(ManagerPhase::Ready);
                true
            }
            Err(e) => {
                error!(error = %e, "failed to initialize conversation");
                self.lock_control().phase = ManagerPhase::Uninitialized;
                self.publish_phase(ManagerPhase::Uninitialized);
                false
            }
        }
    }

    /// Send the current input buffer.
    ///
    /// Blocked sends are silent no-ops reported as [`SendOutcome::Blocked`].
    /// On dispatch the user message is appended immediately and stays in the
    /// log whatever the response.
    pub async fn send(&self) -> SendOutcome {
        let (text, session_id) = {
            let mut control = self.lock_control();
            if let Some(block) = self.block_reason(&control) {
                debug!(reason = ?block, "send blocked");
                return SendOutcome::Blocked(block);
            }
            let session_id = match self.session_tx.borrow().as_ref() {
                Some(session) => session.id.clone(),
                None => return SendOutcome::Blocked(SendBlock::NoSession),
            };
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return SendOutcome::Blocked(SendBlock::AlreadySending);
            }
            control.phase = ManagerPhase::Sending;
            (std::mem::take(&mut control.input), session_id)
        };
        let _guard = SendGuard { manager: self };

        let (user_message, cleared) = {
            let mut store = self.lock_store();
            let id = store.next_local_id();
            let message = Message::user(id, text.clone());
            store.append_message(message.clone());
            (message, store.clear_error().is_some())
        };
        self.events.publish(SessionEvent::MessageAppended {
            message: user_message,
        });
        if cleared {
            self.events.publish(SessionEvent::ErrorChanged { error: None });
        }
        self.publish_phase(ManagerPhase::Sending);

        let span = tracing::info_span!(
            "session.send",
            request_id = %Uuid::now_v7(),
            session_id = %session_id,
        );
        self.dispatch(&session_id, &text).instrument(span).await
    }

    /// Replace the input buffer with `text` and send it.
    pub async fn send_text(&self, text: impl Into<String>) -> SendOutcome {
        self.set_input(text);
        self.send().await
    }

    async fn dispatch(&self, session_id: &str, text: &str) -> SendOutcome {
        debug!(chars = text.chars().count(), "dispatching message");
        match self.client.send_message(session_id, text).await {
            Ok(exchange) => {
                let reply = exchange.ai_response;
                let merged = {
                    let mut control = self.lock_control();
                    let mut store = self.lock_store();
                    control.connection_failures = 0;
                    store.append_message(reply.clone());
                    if exchange.safety_violation {
                        None
                    } else {
                        Some(store.merge_metadata(&exchange.conversation_update).clone())
                    }
                };

                let announcement = if exchange.safety_violation {
                    Announcement::safety_notice(&reply.content)
                } else {
                    Announcement::AssistantResponded
                };
                self.events.publish(SessionEvent::MessageAppended { message: reply });

                match merged {
                    Some(metadata) => {
                        debug!("response received");
                        self.events.publish(SessionEvent::MetadataUpdated { metadata });
                        self.events.announce(announcement);
                        SendOutcome::Delivered
                    }
                    None => {
                        info!("response withheld by safety check; progress unchanged");
                        self.events.announce(announcement);
                        SendOutcome::SafetyWithheld
                    }
                }
            }
            Err(e) => {
                self.record_failure(&e);
                SendOutcome::Failed
            }
        }
    }

    fn record_failure(&self, failure: &ClientError) {
        let text = failure_text(failure);
        warn!(error = %failure, network = failure.is_network(), "send failed");

        let message = {
            let mut control = self.lock_control();
            let mut store = self.lock_store();
            if failure.is_network() {
                control.connection_failures += 1;
            }
            let id = store.next_local_id();
            let message = Message::assistant_error(id, text.clone());
            store.append_message(message.clone());
            store.set_error(text.clone());
            message
        };

        self.events.publish(SessionEvent::MessageAppended { message });
        self.events.publish(SessionEvent::ErrorChanged {
            error: Some(text.clone()),
        });
        self.events.announce(if failure.is_network() {
            Announcement::ConnectionError
        } else {
            Announcement::Error(text)
        });
    }

    /// Clear the error banner.
    pub fn dismiss_error(&self) {
        if self.lock_store().clear_error().is_some() {
            self.events.publish(SessionEvent::ErrorChanged { error: None });
        }
    }

    // ------------------------------------------------------------------
    // Connectivity
    // ------------------------------------------------------------------

    /// Report an environment connectivity event and react to it.
    pub fn set_online(&self, online: bool) {
        self.connectivity.set_online(online);
        self.handle_connectivity_change(online);
    }

    /// React to a connectivity transition.
    ///
    /// Going offline raises the offline notice. Coming back clears it only
    /// if it is still the displayed error. Repeated values are ignored.
    pub fn handle_connectivity_change(&self, online: bool) {
        if self.last_online.swap(online, Ordering::AcqRel) == online {
            return;
        }

        if online {
            let cleared = {
                let mut store = self.lock_store();
                if store.error() == Some(OFFLINE_NOTICE) {
                    store.clear_error();
                    true
                } else {
                    false
                }
            };
            info!("connection restored");
            if cleared {
                self.events.publish(SessionEvent::ErrorChanged { error: None });
            }
            self.events.announce(Announcement::ConnectionRestored);
        } else {
            self.lock_store().set_error(OFFLINE_NOTICE);
            warn!("connection lost");
            self.events.publish(SessionEvent::ErrorChanged {
                error: Some(OFFLINE_NOTICE.to_string()),
            });
            self.events.announce(Announcement::ConnectionLost);
        }
    }

    /// Follow the connectivity monitor in a background task.
    ///
    /// The task ends when the monitor is dropped.
    pub fn watch_connectivity(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.connectivity.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                self.handle_connectivity_change(online);
            }
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn publish_phase(&self, phase: ManagerPhase) {
        self.events.publish(SessionEvent::PhaseChanged { phase });
    }

    fn lock_control(&self) -> std::sync::MutexGuard<'_, Control> {
        self.control.lock().expect("session control lock poisoned")
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, ConversationStore> {
        self.store.lock().expect("conversation store lock poisoned")
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("phase", &self.phase())
            .field("sending", &self.is_sending())
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

/// Text shown for a failed send: the server's own message if it sent one,
/// otherwise a fixed string chosen by failure kind.
pub fn failure_text(failure: &ClientError) -> String {
    match failure.server_message() {
        Some(message) => message.to_string(),
        None if failure.is_network() => CONNECTION_ERROR_TEXT.to_string(),
        None => GENERIC_ERROR_TEXT.to_string(),
    }
}

/// Returns the manager to `Ready` when a send settles or is dropped.
struct SendGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut control) = self.manager.control.lock() {
            control.phase = ManagerPhase::Ready;
        }
        self.manager.in_flight.store(false, Ordering::Release);
        self.manager.publish_phase(ManagerPhase::Ready);
    }
}
