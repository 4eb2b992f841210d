//! HttpSessionClient -- concrete [`SessionClient`] over the conversation
//! service's REST API.
//!
//! One request per call, no retries and no timeout. Failures are mapped
//! onto [`ClientError`] so the session manager can tell transport problems
//! from server rejections:
//!
//! - transport errors and unreadable error bodies become `Network`
//! - non-2xx responses with a JSON body become `Rejected`
//! - 2xx responses whose body does not decode become `Decode`

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Response;
use serde::de::DeserializeOwned;

use coursewright_core::client::SessionClient;
use coursewright_types::chat::{CreatedSession, MessageExchange};
use coursewright_types::config::{ClientConfig, FORMAT_PLACEHOLDER, SESSION_ID_PLACEHOLDER};
use coursewright_types::error::ClientError;
use coursewright_types::export::{ExportFormat, ExportResponse, ExportSummary};

use super::disposition::filename_from_disposition;
use super::types::{ErrorBody, SendMessageRequest};

/// Conversation service client.
#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    client: reqwest::Client,
    base_url: String,
    export_path: String,
}

impl HttpSessionClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            export_path: config.export_path.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Render the export path template for a session and format.
    pub fn export_url(&self, session_id: &str, format: ExportFormat) -> String {
        let path = self
            .export_path
            .replace(SESSION_ID_PLACEHOLDER, session_id)
            .replace(FORMAT_PLACEHOLDER, format.extension());
        self.url(&path)
    }
}

impl SessionClient for HttpSessionClient {
    async fn create_session(&self) -> Result<CreatedSession, ClientError> {
        let url = self.url("/api/conversations");
        tracing::debug!(%url, "creating conversation");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }

    async fn send_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<MessageExchange, ClientError> {
        let url = self.url(&format!("/api/conversations/{session_id}/messages"));
        tracing::debug!(%url, "posting message");

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest { message: text })
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }

    async fn request_export(
        &self,
        session_id: &str,
        format: ExportFormat,
    ) -> Result<ExportResponse, ClientError> {
        let url = self.export_url(session_id, format);
        tracing::debug!(%url, %format, "requesting export");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        if format.is_structured() {
            let summary: ExportSummary = read_json(response).await?;
            return Ok(ExportResponse::Summary(summary));
        }

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let suggested_filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("failed to read export body: {e}")))?;

        Ok(ExportResponse::Download {
            bytes: bytes.to_vec(),
            suggested_filename,
        })
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    ClientError::Network(format!("HTTP request failed: {e}"))
}

/// Decode a 2xx JSON body, or classify the failure.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(format!("failed to parse response: {e}")))
}

/// Classify a non-2xx response.
///
/// A JSON body means the server answered, so this is a rejection carrying
/// the body's `error` text. A body that is not JSON is treated like a
/// transport failure.
async fn rejection(response: Response) -> ClientError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => {
            tracing::debug!(%status, "service rejected request");
            ClientError::Rejected {
                status: status.as_u16(),
                message: body.into_message(),
            }
        }
        Err(e) => ClientError::Network(format!("HTTP {status} with unreadable body: {e}")),
    }
}
