pub mod ndjson;

use std::ops::ControlFlow;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::agent::ndjson::LineBuffer;
use crate::errors::AppError;
use crate::models::{BackendChatRequest, BackendRecord, ChatMessage, StreamEvent};

/// Streaming client for an Ollama-compatible `/api/chat` endpoint.
///
/// The underlying `reqwest::Client` is a shared connection pool; cloning the
/// service is cheap and every request gets its own connection.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// `timeout` bounds each request as a whole, streamed body included.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends the chat request and returns as soon as response headers arrive.
    /// A non-success status is not an error here: Ollama reports failures like
    /// an unknown model as an `{"error": ...}` body, which the record stream
    /// turns into an error event.
    pub async fn open_chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, AppError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = BackendChatRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Inference request to {url} failed: {e}");
                if e.is_connect() || e.is_timeout() {
                    AppError::backend_unavailable(self.base_url.clone(), e)
                } else {
                    AppError::Unexpected(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Inference backend answered HTTP {status} for model '{}'", self.model);
        }
        Ok(resp)
    }
}

/// Reads the backend body line by line and forwards the resulting events.
///
/// Returns after a terminal event, at end of body, on a transport failure
/// (reported as one error event), or as soon as the receiver is dropped.
/// Returning drops `resp`, which releases the backend connection.
pub async fn forward_records(resp: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut body = std::pin::pin!(resp.bytes_stream());
    let mut lines = LineBuffer::new();

    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => {
                debug!("Client disconnected, releasing inference stream");
                return;
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for line in lines.push(&bytes) {
                    if emit_line(&line, &tx).await.is_break() {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                let err = AppError::BackendStream(e);
                error!("{err}");
                let _ = tx.send(StreamEvent::error(err.to_string())).await;
                return;
            }
            None => break,
        }
    }

    if let Some(line) = lines.finish() {
        let _ = emit_line(&line, &tx).await;
    }
    debug!("Inference stream ended");
}

async fn emit_line(line: &str, tx: &mpsc::Sender<StreamEvent>) -> ControlFlow<()> {
    let record: BackendRecord = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            debug!("Skipping unparsable record ({e}): {line}");
            return ControlFlow::Continue(());
        }
    };

    let Some(event) = StreamEvent::from_record(record) else {
        return ControlFlow::Continue(());
    };

    let terminal = event.is_terminal();
    if let StreamEvent::Error { error } = &event {
        warn!("Inference backend reported an error: {error}");
    }
    if tx.send(event).await.is_err() || terminal {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}
