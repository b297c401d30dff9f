use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::agent::{forward_records, OllamaClient};
use crate::errors::AppError;
use crate::models::{ChatMessage, StreamEvent};
use crate::prompt::build_system_prompt;
use crate::repository::catalog_repository::CatalogRepository;

const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct ChatService {
    catalog: CatalogRepository,
    agent: OllamaClient,
}

impl ChatService {
    pub fn new(catalog: CatalogRepository, agent: OllamaClient) -> Self {
        Self { catalog, agent }
    }

    pub async fn get_products(&self) -> Vec<Value> {
        self.catalog.find_all().await
    }

    /// Rebuilt from disk on every call.
    pub async fn system_prompt(&self) -> String {
        build_system_prompt(&self.catalog.prompt_json().await)
    }

    /// Relays one conversation to the inference backend.
    ///
    /// Errors are only returned for failures before the backend answers;
    /// anything after that arrives as a `StreamEvent::Error` in the stream.
    /// Dropping the returned stream stops the reader task and closes the
    /// backend connection.
    pub async fn relay(
        &self,
        history: Vec<ChatMessage>,
    ) -> Result<ReceiverStream<StreamEvent>, AppError> {
        let span = info_span!(
            "chat_relay",
            request_id = %Uuid::new_v4(),
            messages = history.len()
        );

        async move {
            let messages = outbound_messages(self.system_prompt().await, history);
            let resp = self.agent.open_chat_stream(&messages).await?;
            info!("Streaming reply from {}", self.agent.base_url());

            let (tx, rx) = mpsc::channel(EVENT_BUFFER);
            tokio::spawn(forward_records(resp, tx).in_current_span());
            Ok(ReceiverStream::new(rx))
        }
        .instrument(span)
        .await
    }
}

/// System prompt first, then the caller's turns untouched and in order.
pub fn outbound_messages(system_prompt: String, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history);
    messages
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use futures_util::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::agent::tests::{client, closed_port_url, spawn_backend};
    use crate::repository::catalog_repository::tests::{scratch_dir, write_catalog};

    pub(crate) fn service(base_url: &str, catalog_paths: Vec<PathBuf>) -> ChatService {
        ChatService::new(CatalogRepository::new(catalog_paths), client(base_url))
    }

    #[test]
    fn outbound_list_prepends_system_prompt() {
        let history = vec![
            ChatMessage::new("user", "I play blues"),
            ChatMessage::new("assistant", "Try a Telecaster"),
            ChatMessage::new("user", "Something cheaper?"),
        ];
        let messages = outbound_messages("prompt".to_string(), history.clone());

        assert_eq!(messages.len(), history.len() + 1);
        assert_eq!(messages[0], ChatMessage::system("prompt"));
        assert_eq!(&messages[1..], &history[..]);
    }

    #[test]
    fn empty_history_still_sends_system_prompt() {
        let messages = outbound_messages("prompt".to_string(), Vec::new());
        assert_eq!(messages, vec![ChatMessage::system("prompt")]);
    }

    #[tokio::test]
    async fn relay_sends_catalog_prompt_and_streams_events() {
        let dir = scratch_dir();
        let catalog = write_catalog(&dir, r#"[{"name":"Player Plus Stratocaster","price":1099}]"#);
        let backend = spawn_backend(concat!(
            "{\"message\":{\"content\":\"Hi\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"!\"},\"done\":true}\n",
        ))
        .await;

        let svc = service(&backend.base_url, vec![catalog]);
        let events: Vec<StreamEvent> = svc
            .relay(vec![ChatMessage::new("user", "Recommend a guitar")])
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());

        let received = backend.received.lock().unwrap();
        let messages = received[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert!(messages[0]["content"]
            .as_str()
            .unwrap()
            .contains("\"name\": \"Player Plus Stratocaster\""));
        assert_eq!(messages[1], json!({"role": "user", "content": "Recommend a guitar"}));
    }

    #[tokio::test]
    async fn relay_without_catalog_embeds_empty_list() {
        let dir = scratch_dir();
        let backend = spawn_backend("{\"message\":{\"content\":\"ok\"},\"done\":true}\n").await;

        let svc = service(&backend.base_url, vec![dir.join("products.json")]);
        let events: Vec<StreamEvent> = svc.relay(Vec::new()).await.unwrap().collect().await;
        assert_eq!(events, vec![StreamEvent::Content { content: "ok".into(), done: true }]);

        let received = backend.received.lock().unwrap();
        let prompt = received[0]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("product catalog:\n\n[]\n\n"));
    }

    #[tokio::test]
    async fn relay_picks_up_catalog_edits_between_requests() {
        let dir = scratch_dir();
        let catalog = write_catalog(&dir, r#"[{"name":"Mustang"}]"#);
        let svc = service("http://127.0.0.1:9", vec![catalog]);
        assert!(svc.system_prompt().await.contains("Mustang"));

        write_catalog(&dir, r#"[{"name":"Jaguar"}]"#);
        let prompt = svc.system_prompt().await;
        assert!(prompt.contains("Jaguar"));
        assert!(!prompt.contains("Mustang"));
    }

    #[tokio::test]
    async fn relay_fails_before_streaming_when_backend_is_down() {
        let svc = service(&closed_port_url().await, Vec::new());
        match svc.relay(vec![ChatMessage::new("user", "hi")]).await {
            Err(err) => assert!(err.is_backend_unavailable()),
            Ok(_) => panic!("relay should fail without a backend"),
        }
    }
}
