//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API.
//! The endpoint is the fully normalized completions URL (see
//! `config::normalize_base_url`); authentication is a bearer token.
//!
//! Each request carries a fixed 30-second timeout. Timeouts and server-side
//! statuses (5xx/429) are retried with linear backoff per the configured
//! [`RetryPolicy`]; any other failure is permanent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::retry::{is_retryable_status, RetryPolicy};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::ExtractionBackend;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling temperature for extraction requests
const TEMPERATURE: f32 = 0.2;

/// Response token cap; extractions are tiny
const MAX_TOKENS: u32 = 250;

/// OpenAI-compatible extraction backend
#[derive(Clone)]
pub struct OpenAiBackend {
    http_client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    retry: RetryPolicy,
}

/// One attempt's failure, split by whether another attempt makes sense
enum CallFailure {
    Retryable(String),
    Permanent(Error),
}

impl OpenAiBackend {
    /// Create a backend against a normalized completions endpoint
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Build from pipeline configuration; `None` when no API key is set
    pub fn from_config(config: &PipelineConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self::new(&config.endpoint, &config.model, api_key))
    }

    /// Replace the retry policy (tests use short backoffs)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Make a chat completion request with bounded retries
    async fn chat_completion(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
        };

        let mut attempt = 1u32;
        loop {
            match self.send_once(&request).await {
                Ok(content) => return Ok(content),
                Err(CallFailure::Permanent(e)) => return Err(e),
                Err(CallFailure::Retryable(why)) => {
                    if !self.retry.should_retry(attempt) {
                        return Err(Error::InvalidData(format!(
                            "Model call failed after {} attempts: {}",
                            attempt, why
                        )));
                    }
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Model call attempt {} failed ({}), retrying in {:?}",
                        attempt, why, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One request/response cycle, classifying the failure mode
    async fn send_once(
        &self,
        request: &ChatCompletionRequest,
    ) -> std::result::Result<String, CallFailure> {
        let result = self
            .http_client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(CallFailure::Retryable(format!("timeout: {}", e)))
            }
            Err(e) => return Err(CallFailure::Permanent(e.into())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_retryable_status(status.as_u16()) {
                return Err(CallFailure::Retryable(format!(
                    "server error {}: {}",
                    status, body
                )));
            }
            return Err(CallFailure::Permanent(Error::InvalidData(format!(
                "Model API error {}: {}",
                status, body
            ))));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CallFailure::Permanent(e.into()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                CallFailure::Permanent(Error::InvalidData("No choices in model response".into()))
            })
    }
}

#[async_trait]
impl ExtractionBackend for OpenAiBackend {
    async fn extract(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let content = self.chat_completion(system_prompt, user_message).await?;
        debug!("Model response: {}", content);
        Ok(content)
    }
}
