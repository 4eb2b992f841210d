//! BoxSessionClient -- object-safe dynamic dispatch wrapper for SessionClient.
//!
//! 1. Define an object-safe `SessionClientDyn` trait with boxed futures
//! 2. Blanket-impl `SessionClientDyn` for all `T: SessionClient`
//! 3. `BoxSessionClient` wraps `Box<dyn SessionClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use coursewright_types::chat::{CreatedSession, MessageExchange};
use coursewright_types::error::ClientError;
use coursewright_types::export::{ExportFormat, ExportResponse};

use super::session_client::SessionClient;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`SessionClient`] with boxed futures.
pub trait SessionClientDyn: Send + Sync {
    fn create_session_boxed(&self) -> BoxFuture<'_, Result<CreatedSession, ClientError>>;

    fn send_message_boxed<'a>(
        &'a self,
        session_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<MessageExchange, ClientError>>;

    fn request_export_boxed<'a>(
        &'a self,
        session_id: &'a str,
        format: ExportFormat,
    ) -> BoxFuture<'a, Result<ExportResponse, ClientError>>;
}

impl<T: SessionClient> SessionClientDyn for T {
    fn create_session_boxed(&self) -> BoxFuture<'_, Result<CreatedSession, ClientError>> {
        Box::pin(self.create_session())
    }

    fn send_message_boxed<'a>(
        &'a self,
        session_id: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<MessageExchange, ClientError>> {
        Box::pin(self.send_message(session_id, text))
    }

    fn request_export_boxed<'a>(
        &'a self,
        session_id: &'a str,
        format: ExportFormat,
    ) -> BoxFuture<'a, Result<ExportResponse, ClientError>> {
        Box::pin(self.request_export(session_id, format))
    }
}

/// Type-erased session client.
///
/// Lets the session manager and the export coordinator share one transport
/// chosen at runtime (HTTP in the binary, scripted clients in tests).
pub struct BoxSessionClient {
    inner: Box<dyn SessionClientDyn + Send + Sync>,
}

impl BoxSessionClient {
    pub fn new<T: SessionClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    pub async fn create_session(&self) -> Result<CreatedSession, ClientError> {
        self.inner.create_session_boxed().await
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<MessageExchange, ClientError> {
        self.inner.send_message_boxed(session_id, text).await
    }

    pub async fn request_export(
        &self,
        session_id: &str,
        format: ExportFormat,
    ) -> Result<ExportResponse, ClientError> {
        self.inner.request_export_boxed(session_id, format).await
    }
}

impl std::fmt::Debug for BoxSessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSessionClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursewright_types::chat::{Message, MessageId, MetadataDelta, Sender};
    use coursewright_types::export::ExportSummary;

    struct EchoClient;

    impl SessionClient for EchoClient {
        async fn create_session(&self) -> Result<CreatedSession, ClientError> {
            Ok(CreatedSession {
                session_id: "echo".to_string(),
                conversation: Default::default(),
                welcome_message: Message::user(1, "hello"),
            })
        }

        async fn send_message(
            &self,
            session_id: &str,
            text: &str,
        ) -> Result<MessageExchange, ClientError> {
            Ok(MessageExchange {
                ai_response: Message {
                    id: MessageId::Text(session_id.to_string()),
                    sender: Sender::Assistant,
                    content: text.to_uppercase(),
                    timestamp: "2024-05-01T09:30:00.000Z".to_string(),
                    message_type: Default::default(),
                },
                conversation_update: MetadataDelta::default(),
                safety_violation: false,
            })
        }

        async fn request_export(
            &self,
            _session_id: &str,
            format: ExportFormat,
        ) -> Result<ExportResponse, ClientError> {
            if format.is_structured() {
                Ok(ExportResponse::Summary(ExportSummary::default()))
            } else {
                Err(ClientError::Network("offline".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn boxed_client_delegates_all_operations() {
        let client = BoxSessionClient::new(EchoClient);

        let created = client.create_session().await.unwrap();
        assert_eq!(created.session_id, "echo");

        let exchange = client.send_message("abc", "hi there").await.unwrap();
        assert_eq!(exchange.ai_response.content, "HI THERE");
        assert_eq!(exchange.ai_response.id, MessageId::Text("abc".to_string()));

        assert!(matches!(
            client.request_export("abc", ExportFormat::Json).await,
            Ok(ExportResponse::Summary(_))
        ));
        assert!(
            client
                .request_export("abc", ExportFormat::Pdf)
                .await
                .is_err()
        );
    }

    #[test]
    fn debug_impl_hides_inner() {
        let client = BoxSessionClient::new(EchoClient);
        assert!(format!("{client:?}").contains("BoxSessionClient"));
    }
}
