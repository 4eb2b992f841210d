//! Export coordinator.
//!
//! Issues export and summary requests for the current session and tracks
//! their status in an [`ExportRequestState`] watch channel. It shares the
//! transport with the session manager but never touches conversation state.
//!
//! The status is never left `InFlight` once a request settles. A drop guard
//! covers cancelled futures as well as normal completion.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use coursewright_types::chat::Session;
use coursewright_types::error::ClientError;
use coursewright_types::export::{
    ExportFormat, ExportRequestState, ExportResponse, ExportStatus, ExportSummary,
};

use crate::client::BoxSessionClient;

use super::filename::download_filename;
use super::sink::DownloadSink;

pub const NO_SESSION_TEXT: &str = "No active session to export";
pub const EXPORTED_TEXT: &str = "Data exported successfully";
pub const EXPORT_REJECTED_TEXT: &str = "Export failed";
pub const EXPORT_FAILED_TEXT: &str = "Failed to export data";
pub const SUMMARY_TEXT: &str = "Summary generated successfully";
pub const SUMMARY_FAILED_TEXT: &str = "Failed to get summary";

/// Runs export and summary requests for one session.
pub struct ExportCoordinator<S> {
    client: Arc<BoxSessionClient>,
    sink: S,
    session: watch::Receiver<Option<Session>>,
    state: watch::Sender<ExportRequestState>,
    last_download: Mutex<Option<PathBuf>>,
}

impl<S: DownloadSink> ExportCoordinator<S> {
    /// `session` follows the session manager's slot, so exports issued
    /// before initialization completes see no session.
    pub fn new(
        client: Arc<BoxSessionClient>,
        sink: S,
        session: watch::Receiver<Option<Session>>,
    ) -> Self {
        let (state, _) = watch::channel(ExportRequestState::default());
        Self {
            client,
            sink,
            session,
            state,
            last_download: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ExportRequestState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ExportRequestState> {
        self.state.subscribe()
    }

    /// Where the most recent download was saved.
    pub fn last_download(&self) -> Option<PathBuf> {
        self.last_download
            .lock()
            .expect("last download lock poisoned")
            .clone()
    }

    /// Export the session in `format`.
    ///
    /// File formats are saved through the sink. The structured format is
    /// stored as the state's payload for display. Returns the settled state.
    pub async fn export_as(&self, format: ExportFormat) -> ExportRequestState {
        let Some(session_id) = self.session_id() else {
            self.settle(ExportStatus::Error, NO_SESSION_TEXT, None);
            return self.state();
        };
        if !self.begin() {
            debug!(%format, "export ignored: another request is in flight");
            return self.state();
        }
        let _guard = SettleGuard {
            state: &self.state,
            message: EXPORT_FAILED_TEXT,
        };

        let span = tracing::info_span!(
            "export.request",
            request_id = %Uuid::now_v7(),
            session_id = %session_id,
            format = %format,
        );
        self.run_export(&session_id, format).instrument(span).await;
        self.state()
    }

    /// Fetch the structured summary without choosing a file format.
    ///
    /// Does nothing when there is no session.
    pub async fn get_summary(&self) -> ExportRequestState {
        let Some(session_id) = self.session_id() else {
            debug!("summary ignored: no session");
            return self.state();
        };
        if !self.begin() {
            debug!("summary ignored: another request is in flight");
            return self.state();
        }
        let _guard = SettleGuard {
            state: &self.state,
            message: SUMMARY_FAILED_TEXT,
        };

        let span = tracing::info_span!(
            "export.summary",
            request_id = %Uuid::now_v7(),
            session_id = %session_id,
        );
        self.run_summary(&session_id).instrument(span).await;
        self.state()
    }

    async fn run_export(&self, session_id: &str, format: ExportFormat) {
        match self.client.request_export(session_id, format).await {
            Ok(ExportResponse::Summary(summary)) => {
                info!("structured export received");
                self.settle(ExportStatus::Success, EXPORTED_TEXT, Some(summary));
            }
            Ok(ExportResponse::Download {
                bytes,
                suggested_filename,
            }) => {
                let filename = download_filename(
                    suggested_filename.as_deref(),
                    session_id,
                    format,
                    Utc::now().date_naive(),
                );
                let size = bytes.len();
                match self.sink.save(&filename, bytes).await {
                    Ok(path) => {
                        info!(path = %path.display(), bytes = size, "export saved");
                        *self
                            .last_download
                            .lock()
                            .expect("last download lock poisoned") = Some(path);
                        let message = format!(
                            "{} file downloaded successfully",
                            format.extension().to_uppercase()
                        );
                        self.settle(ExportStatus::Success, &message, None);
                    }
                    Err(e) => {
                        warn!(error = %e, %filename, "failed to save export");
                        self.settle(ExportStatus::Error, EXPORT_FAILED_TEXT, None);
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "export request failed");
                let message = failure_message(&e, EXPORT_FAILED_TEXT, EXPORT_REJECTED_TEXT);
                self.settle(ExportStatus::Error, &message, None);
            }
        }
    }

    async fn run_summary(&self, session_id: &str) {
        match self
            .client
            .request_export(session_id, ExportFormat::Json)
            .await
        {
            Ok(ExportResponse::Summary(summary)) => {
                info!("summary received");
                self.settle(ExportStatus::Success, SUMMARY_TEXT, Some(summary));
            }
            Ok(ExportResponse::Download { .. }) => {
                warn!("summary request returned a file instead of a summary");
                self.settle(ExportStatus::Error, SUMMARY_FAILED_TEXT, None);
            }
            Err(e) => {
                warn!(error = %e, "summary request failed");
                let message = failure_message(&e, SUMMARY_FAILED_TEXT, SUMMARY_FAILED_TEXT);
                self.settle(ExportStatus::Error, &message, None);
            }
        }
    }

    fn session_id(&self) -> Option<String> {
        self.session.borrow().as_ref().map(|s| s.id.clone())
    }

    /// Enter `InFlight`, clearing the message but keeping the last payload.
    /// Returns `false` if a request is already running.
    fn begin(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            state.status = ExportStatus::InFlight;
            state.message.clear();
            true
        })
    }

    fn settle(&self, status: ExportStatus, message: &str, payload: Option<ExportSummary>) {
        self.state.send_modify(|state| {
            state.status = status;
            state.message = message.to_string();
            if payload.is_some() {
                state.payload = payload;
            }
        });
    }
}

impl<S> std::fmt::Debug for ExportCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportCoordinator")
            .field("status", &self.state.borrow().status)
            .finish_non_exhaustive()
    }
}

fn failure_message(failure: &ClientError, network: &str, rejected: &str) -> String {
    match failure.server_message() {
        Some(message) => message.to_string(),
        None if failure.is_network() => network.to_string(),
        None => rejected.to_string(),
    }
}

/// Moves a still-`InFlight` state to `Error` when the request ends.
struct SettleGuard<'a> {
    state: &'a watch::Sender<ExportRequestState>,
    message: &'static str,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if !state.is_in_flight() {
                return false;
            }
            state.status = ExportStatus::Error;
            state.message = self.message.to_string();
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use coursewright_types::chat::{CreatedSession, MessageExchange};
    use coursewright_types::error::DownloadError;
    use serde_json::json;

    use crate::client::SessionClient;

    struct ExportClient {
        replies: Mutex<VecDeque<Result<ExportResponse, ClientError>>>,
        hang: bool,
    }

    impl ExportClient {
        fn with(replies: Vec<Result<ExportResponse, ClientError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                hang: false,
            }
        }

        fn hanging() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                hang: true,
            }
        }
    }

    impl SessionClient for ExportClient {
        async fn create_session(&self) -> Result<CreatedSession, ClientError> {
            Err(ClientError::Network("unused".into()))
        }

        async fn send_message(
            &self,
            _session_id: &str,
            _text: &str,
        ) -> Result<MessageExchange, ClientError> {
            Err(ClientError::Network("unused".into()))
        }

        async fn request_export(
            &self,
            _session_id: &str,
            _format: ExportFormat,
        ) -> Result<ExportResponse, ClientError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Network("no reply scripted".into())))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    impl DownloadSink for MemorySink {
        async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf, DownloadError> {
            if self.fail {
                return Err(DownloadError::InvalidFilename(filename.to_string()));
            }
            self.saved.lock().unwrap().push((filename.to_string(), bytes));
            Ok(PathBuf::from("/downloads").join(filename))
        }
    }

    fn summary() -> ExportSummary {
        serde_json::from_value(json!({
            "progress": {"completion_percentage": 60, "current_step": 3, "total_steps": 5},
            "key_insights": ["Audience is clear"]
        }))
        .unwrap()
    }

    fn coordinator(
        client: ExportClient,
        sink: MemorySink,
        session: Option<&str>,
    ) -> (ExportCoordinator<MemorySink>, watch::Sender<Option<Session>>) {
        let (tx, rx) = watch::channel(session.map(Session::new));
        let coordinator = ExportCoordinator::new(Arc::new(BoxSessionClient::new(client)), sink, rx);
        (coordinator, tx)
    }

    #[tokio::test]
    async fn no_session_sets_error_without_request() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Summary(summary()))]),
            MemorySink::default(),
            None,
        );
        let state = coordinator.export_as(ExportFormat::Pdf).await;
        assert_eq!(state.status, ExportStatus::Error);
        assert_eq!(state.message, NO_SESSION_TEXT);
    }

    #[tokio::test]
    async fn summary_without_session_is_noop() {
        let (coordinator, _tx) =
            coordinator(ExportClient::with(vec![]), MemorySink::default(), None);
        let state = coordinator.get_summary().await;
        assert_eq!(state, ExportRequestState::default());
    }

    #[tokio::test]
    async fn json_export_stores_payload() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Summary(summary()))]),
            MemorySink::default(),
            Some("abc"),
        );
        let state = coordinator.export_as(ExportFormat::Json).await;
        assert_eq!(state.status, ExportStatus::Success);
        assert_eq!(state.message, EXPORTED_TEXT);
        assert_eq!(state.payload, Some(summary()));
        assert!(coordinator.last_download().is_none());
    }

    #[tokio::test]
    async fn download_uses_hint() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Download {
                bytes: b"%PDF-1.4".to_vec(),
                suggested_filename: Some("design.pdf".into()),
            })]),
            MemorySink::default(),
            Some("abc"),
        );
        let state = coordinator.export_as(ExportFormat::Pdf).await;
        assert_eq!(state.status, ExportStatus::Success);
        assert_eq!(state.message, "PDF file downloaded successfully");
        assert_eq!(
            coordinator.last_download(),
            Some(PathBuf::from("/downloads/design.pdf"))
        );
        let saved = coordinator.sink.saved.lock().unwrap();
        assert_eq!(saved[0].0, "design.pdf");
        assert_eq!(saved[0].1, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn download_without_hint_uses_fallback_name() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Download {
                bytes: b"a,b\n".to_vec(),
                suggested_filename: None,
            })]),
            MemorySink::default(),
            Some("abc"),
        );
        let state = coordinator.export_as(ExportFormat::Csv).await;
        assert_eq!(state.message, "CSV file downloaded successfully");

        let saved = coordinator.sink.saved.lock().unwrap();
        let name = &saved[0].0;
        assert!(name.starts_with("course_design_abc_"));
        assert!(name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn sink_failure_is_reported() {
        let sink = MemorySink {
            fail: true,
            ..Default::default()
        };
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Download {
                bytes: vec![1, 2, 3],
                suggested_filename: Some("x.pdf".into()),
            })]),
            sink,
            Some("abc"),
        );
        let state = coordinator.export_as(ExportFormat::Pdf).await;
        assert_eq!(state.status, ExportStatus::Error);
        assert_eq!(state.message, EXPORT_FAILED_TEXT);
    }

    #[tokio::test]
    async fn export_failure_messages() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![
                Err(ClientError::Rejected {
                    status: 404,
                    message: Some("Session not found".into()),
                }),
                Err(ClientError::Rejected {
                    status: 500,
                    message: None,
                }),
                Err(ClientError::Network("refused".into())),
            ]),
            MemorySink::default(),
            Some("abc"),
        );
        assert_eq!(
            coordinator.export_as(ExportFormat::Pdf).await.message,
            "Session not found"
        );
        assert_eq!(
            coordinator.export_as(ExportFormat::Pdf).await.message,
            EXPORT_REJECTED_TEXT
        );
        assert_eq!(
            coordinator.export_as(ExportFormat::Pdf).await.message,
            EXPORT_FAILED_TEXT
        );
    }

    #[tokio::test]
    async fn summary_failure_keeps_previous_payload() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![
                Ok(ExportResponse::Summary(summary())),
                Err(ClientError::Rejected {
                    status: 500,
                    message: None,
                }),
            ]),
            MemorySink::default(),
            Some("abc"),
        );
        let first = coordinator.get_summary().await;
        assert_eq!(first.message, SUMMARY_TEXT);

        let second = coordinator.get_summary().await;
        assert_eq!(second.status, ExportStatus::Error);
        assert_eq!(second.message, SUMMARY_FAILED_TEXT);
        assert_eq!(second.payload, Some(summary()));
    }

    #[tokio::test]
    async fn watchers_see_in_flight_then_settled() {
        let (coordinator, _tx) = coordinator(
            ExportClient::with(vec![Ok(ExportResponse::Summary(summary()))]),
            MemorySink::default(),
            Some("abc"),
        );
        let rx = coordinator.watch_state();
        coordinator.get_summary().await;
        assert_eq!(rx.borrow().status, ExportStatus::Success);
    }

    #[tokio::test]
    async fn cancelled_request_does_not_stay_in_flight() {
        let (coordinator, _tx) =
            coordinator(ExportClient::hanging(), MemorySink::default(), Some("abc"));

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            coordinator.export_as(ExportFormat::Pdf),
        )
        .await;
        assert!(result.is_err());

        let state = coordinator.state();
        assert_eq!(state.status, ExportStatus::Error);
        assert_eq!(state.message, EXPORT_FAILED_TEXT);
    }
}
