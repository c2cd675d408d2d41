//! Mock backend for testing
//!
//! Returns scripted content strings in order, falling back to the last one
//! when the script runs out. Records calls so tests can assert whether the
//! pipeline reached the model at all.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::ExtractionBackend;

/// Scripted extraction backend for tests
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<Vec<MockReply>>,
    calls: AtomicUsize,
}

#[derive(Clone)]
enum MockReply {
    Content(String),
    Failure(String),
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that always answers with the given content
    pub fn with_content(content: &str) -> Self {
        let backend = Self::new();
        backend.push_content(content);
        backend
    }

    /// Backend that always answers with the literal "null"
    pub fn not_a_transaction() -> Self {
        Self::with_content("null")
    }

    /// Queue a content reply
    pub fn push_content(&self, content: &str) {
        self.script
            .lock()
            .expect("mock script lock")
            .push(MockReply::Content(content.to_string()));
    }

    /// Queue a failed call
    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .expect("mock script lock")
            .push(MockReply::Failure(message.to_string()));
    }

    /// How many times extract() was invoked
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionBackend for MockBackend {
    async fn extract(&self, _system_prompt: &str, _user_message: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().expect("mock script lock");
        let reply = script
            .get(call)
            .or_else(|| script.last())
            .cloned()
            .unwrap_or(MockReply::Content("null".to_string()));

        match reply {
            MockReply::Content(content) => Ok(content),
            MockReply::Failure(message) => Err(Error::InvalidData(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let backend = MockBackend::new();
        backend.push_content("first");
        backend.push_content("second");

        assert_eq!(backend.extract("s", "u").await.unwrap(), "first");
        assert_eq!(backend.extract("s", "u").await.unwrap(), "second");
        // Script exhausted: last reply repeats
        assert_eq!(backend.extract("s", "u").await.unwrap(), "second");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_reply() {
        let backend = MockBackend::new();
        backend.push_failure("boom");
        assert!(backend.extract("s", "u").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_script_defaults_to_null() {
        let backend = MockBackend::new();
        assert_eq!(backend.extract("s", "u").await.unwrap(), "null");
    }
}
