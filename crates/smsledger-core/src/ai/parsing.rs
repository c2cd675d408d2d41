//! Parsing of model responses
//!
//! Models wrap JSON in markdown fences, return the literal string "null" for
//! non-transactions, and occasionally produce garbage. All of that is
//! normalized here into a typed [`ModelVerdict`]; shape mismatches become
//! typed errors instead of propagating nulls.

use crate::error::{Error, Result};

use super::types::ModelExtraction;

/// Outcome of interpreting the model's content string
#[derive(Debug, Clone, PartialEq)]
pub enum ModelVerdict {
    /// The model judged the message not to be a transaction
    NotATransaction,
    /// A structured extraction, validated against the expected shape
    Extraction(ModelExtraction),
}

/// Strip markdown code-fence markers from model content
///
/// Handles a leading fence with an optional language tag and a trailing
/// fence; content without fences is returned trimmed.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the rest of the fence line (e.g. "json")
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}

/// Interpret the model's content: fences stripped, "null"/empty means "not a
/// transaction", anything else must parse as a JSON object
pub fn parse_content(content: &str) -> Result<ModelVerdict> {
    let cleaned = strip_code_fences(content);

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("null") {
        return Ok(ModelVerdict::NotATransaction);
    }

    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from model: {} | Raw: {}",
            e,
            truncate(&cleaned)
        ))
    })?;

    if !value.is_object() {
        return Err(Error::InvalidData(format!(
            "Model output is not a JSON object | Raw: {}",
            truncate(&cleaned)
        )));
    }

    let extraction: ModelExtraction = serde_json::from_value(value)?;
    Ok(ModelVerdict::Extraction(extraction))
}

/// Truncate long model output for error messages
fn truncate(s: &str) -> String {
    if s.len() > 200 {
        let cut: String = s.chars().take(200).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let content = "```json\n{\"title\": \"Coffee\"}\n```";
        assert_eq!(strip_code_fences(content), "{\"title\": \"Coffee\"}");
    }

    #[test]
    fn test_strip_fences_without_language_tag() {
        let content = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(content), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_literal_null_means_not_a_transaction() {
        assert_eq!(parse_content("null").unwrap(), ModelVerdict::NotATransaction);
        assert_eq!(
            parse_content("```\nNULL\n```").unwrap(),
            ModelVerdict::NotATransaction
        );
        assert_eq!(parse_content("   ").unwrap(), ModelVerdict::NotATransaction);
    }

    #[test]
    fn test_valid_extraction_parses() {
        let verdict =
            parse_content("{\"title\": \"Coffee\", \"amount\": 150, \"category\": \"Food\"}")
                .unwrap();
        match verdict {
            ModelVerdict::Extraction(e) => {
                assert_eq!(e.title.as_deref(), Some("Coffee"));
                assert_eq!(e.amount_value(), Some(150.0));
                assert_eq!(e.category.as_deref(), Some("Food"));
            }
            other => panic!("expected extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_fenced_extraction_parses() {
        let verdict = parse_content("```json\n{\"title\": \"Lunch\", \"amount\": \"250\"}\n```")
            .unwrap();
        match verdict {
            ModelVerdict::Extraction(e) => assert_eq!(e.amount_value(), Some(250.0)),
            other => panic!("expected extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_content("{not json").is_err());
    }

    #[test]
    fn test_non_object_is_an_error() {
        assert!(parse_content("[1, 2, 3]").is_err());
        assert!(parse_content("42").is_err());
    }
}
