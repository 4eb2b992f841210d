//! Application state wiring the client together.
//!
//! AppState pins the core components to the concrete infra adapters: the
//! HTTP transport and the filesystem download sink.

use std::sync::Arc;

use coursewright_core::chat::SessionManager;
use coursewright_core::client::BoxSessionClient;
use coursewright_core::connectivity::ConnectivityMonitor;
use coursewright_core::event::EventBus;
use coursewright_core::export::ExportCoordinator;
use coursewright_infra::config::resolve_event_capacity;
use coursewright_infra::download::FileDownloadSink;
use coursewright_infra::http::HttpSessionClient;
use coursewright_types::config::ClientConfig;

pub type ConcreteExportCoordinator = ExportCoordinator<FileDownloadSink>;

/// Everything a command needs, sharing one transport.
pub struct AppState {
    pub config: ClientConfig,
    pub manager: Arc<SessionManager>,
    pub exports: ConcreteExportCoordinator,
}

impl AppState {
    /// Wire the components. No request is made until a command runs.
    pub fn init(config: ClientConfig, online: bool) -> Self {
        let client = Arc::new(BoxSessionClient::new(HttpSessionClient::new(&config)));
        let events = EventBus::new(resolve_event_capacity(&config));
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&client),
            ConnectivityMonitor::new(online),
            events,
        ));
        let exports = ExportCoordinator::new(
            client,
            FileDownloadSink::new(config.download_dir.clone()),
            manager.session_watch(),
        );

        tracing::debug!(base_url = %config.base_url, online, "client wired");

        Self {
            config,
            manager,
            exports,
        }
    }
}
