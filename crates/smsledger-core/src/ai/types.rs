//! Wire types for the chat-completions call and the model-output boundary

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

/// Structured transaction as returned by the model
///
/// Validated at the boundary: the content is deserialized into this struct
/// and any shape mismatch is a typed parse error, never a null chain. The
/// amount is kept as a raw JSON value because models return both numbers and
/// numeric strings; [`ModelExtraction::amount_value`] coerces it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelExtraction {
    pub title: Option<String>,
    pub amount: Option<Value>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ModelExtraction {
    /// Coerce the amount field, accepting numeric and numeric-string forms
    pub fn amount_value(&self) -> Option<f64> {
        match &self.amount {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 250,
            messages: vec![ChatMessage::system("extract"), ChatMessage::user("sms")],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 250);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "sms");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "{\"title\": \"Coffee\"}"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(
            response.choices[0].message.content,
            "{\"title\": \"Coffee\"}"
        );
    }

    #[test]
    fn test_amount_value_from_number() {
        let extraction: ModelExtraction =
            serde_json::from_value(json!({"title": "Coffee", "amount": 150.5})).unwrap();
        assert_eq!(extraction.amount_value(), Some(150.5));
    }

    #[test]
    fn test_amount_value_from_numeric_string() {
        let extraction: ModelExtraction =
            serde_json::from_value(json!({"title": "Coffee", "amount": " 150.5 "})).unwrap();
        assert_eq!(extraction.amount_value(), Some(150.5));
    }

    #[test]
    fn test_amount_value_missing_or_bad() {
        let extraction: ModelExtraction =
            serde_json::from_value(json!({"title": "Coffee"})).unwrap();
        assert_eq!(extraction.amount_value(), None);

        let extraction: ModelExtraction =
            serde_json::from_value(json!({"title": "Coffee", "amount": "a lot"})).unwrap();
        assert_eq!(extraction.amount_value(), None);
    }
}
