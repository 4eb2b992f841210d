//! SessionClient trait definition.
//!
//! The transport port for the conversation service. Each operation is a
//! single request/response cycle: no retries, no backoff. Failures are
//! returned to the caller for classification.

use coursewright_types::chat::{CreatedSession, MessageExchange};
use coursewright_types::error::ClientError;
use coursewright_types::export::{ExportFormat, ExportResponse};

/// Trait for conversation service transports.
///
/// Uses native async fn in traits (RPITIT). Implementations live in
/// coursewright-infra (e.g., `HttpSessionClient`); tests script their own.
pub trait SessionClient: Send + Sync {
    /// Open a new conversation session.
    fn create_session(
        &self,
    ) -> impl std::future::Future<Output = Result<CreatedSession, ClientError>> + Send;

    /// Post a user message and receive the assistant's reply.
    fn send_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<MessageExchange, ClientError>> + Send;

    /// Fetch an export in the given format.
    ///
    /// Structured formats come back as [`ExportResponse::Summary`], file
    /// formats as [`ExportResponse::Download`].
    fn request_export(
        &self,
        session_id: &str,
        format: ExportFormat,
    ) -> impl std::future::Future<Output = Result<ExportResponse, ClientError>> + Send;
}
