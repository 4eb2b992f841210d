use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coursewright_infra::http::HttpSessionClient;
use coursewright_types::config::ClientConfig;

/// Mock conversation service.
pub struct ServiceMock {
    server: MockServer,
}

impl ServiceMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn client(&self) -> HttpSessionClient {
        HttpSessionClient::new(&ClientConfig {
            base_url: self.server.uri(),
            ..Default::default()
        })
    }

    /// A client pointed at a port nothing listens on.
    pub fn unreachable_client() -> HttpSessionClient {
        HttpSessionClient::new(&ClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        })
    }

    pub async fn mock_create_session(&self) {
        Mock::given(method("POST"))
            .and(path("/api/conversations"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "session_id": "abc",
                "conversation": {
                    "current_step": 1,
                    "total_steps": 5,
                    "completion_percentage": 0,
                    "framework_areas_covered": []
                },
                "welcome_message": {
                    "id": 1,
                    "sender": "assistant",
                    "content": "Welcome! Let's design your course.",
                    "timestamp": "2024-05-01T09:30:00.000Z"
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_message_reply(
        &self,
        message: &str,
        reply: &str,
        update: Value,
        safety: bool,
    ) {
        Mock::given(method("POST"))
            .and(path("/api/conversations/abc/messages"))
            .and(body_json(json!({"message": message})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ai_response": {
                    "id": "m-2",
                    "sender": "assistant",
                    "content": reply,
                    "timestamp": "2024-05-01T09:31:00.000Z",
                    "message_type": if safety { "safety_notice" } else { "normal" }
                },
                "conversation_update": update,
                "safety_violation": safety
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_message_status(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/conversations/abc/messages"))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body, "application/json"),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_export_file(&self, format: &str, bytes: &[u8], disposition: Option<&str>) {
        let mut template = ResponseTemplate::new(200).set_body_bytes(bytes.to_vec());
        if let Some(value) = disposition {
            template = template.insert_header("Content-Disposition", value);
        }
        Mock::given(method("GET"))
            .and(path(format!("/api/conversations/abc/export/{format}")))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_export_summary(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/conversations/abc/export/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_export_status(&self, format: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/conversations/abc/export/{format}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
