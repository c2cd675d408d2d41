//! Test utilities for smsledger-core
//!
//! Provides a mock chat-completions server so the OpenAI-compatible backend
//! and the full pipeline can be exercised over real HTTP in tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Mock chat-completions server for testing
///
/// Answers every POST to `/v1/chat/completions` with a fixed content string
/// wrapped in a chat-completion payload. Can be told to fail the first N
/// requests with a 500, which exercises the retry path.
pub struct MockChatServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    state: Arc<Mutex<ServerState>>,
}

struct ServerState {
    reply: String,
    failures_remaining: u32,
    requests: u32,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start(reply: &str) -> Self {
        Self::start_with_failures(reply, 0).await
    }

    /// Start a server whose first `failures` requests return a 500
    pub async fn start_with_failures(reply: &str, failures: u32) -> Self {
        let state = Arc::new(Mutex::new(ServerState {
            reply: reply.to_string(),
            failures_remaining: failures,
            requests: 0,
        }));

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            state,
        }
    }

    /// Base URL suitable for the `openaiBaseUrl` setting
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Fully normalized completions endpoint
    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// How many requests the server has seen
    pub fn request_count(&self) -> u32 {
        self.state.lock().unwrap().requests
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_completions(
    State(state): State<Arc<Mutex<ServerState>>>,
    Json(_request): Json<Value>,
) -> impl IntoResponse {
    let reply = {
        let mut state = state.lock().unwrap();
        state.requests += 1;
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            None
        } else {
            Some(state.reply.clone())
        }
    };

    match reply {
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "mock server failure"}})),
        ),
        Some(content) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-mock",
                "object": "chat.completion",
                "model": "mock",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })),
        ),
    }
}
