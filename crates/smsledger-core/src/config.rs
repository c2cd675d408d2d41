//! Pipeline configuration
//!
//! Resolved once per processing run from the app-settings JSON blob and
//! passed explicitly into the pipeline. Core logic never reads settings from
//! any ambient source.

use std::collections::HashMap;

use serde_json::Value;

use crate::classify::DEFAULT_SENDER_KEYWORDS;

/// Default model id used when the settings blob does not name one
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default system prompt for the extraction call
pub const DEFAULT_PROMPT: &str = "\
You are a bank SMS transaction extractor. Given an SMS message and a context \
object with heuristic hints, decide whether the SMS describes a completed \
financial transaction. If it does, respond with a JSON object with exactly \
these fields: \"title\" (short merchant or purpose description), \"amount\" \
(number), \"category\" (one word, e.g. Food, Travel, Shopping, Bills, \
Salary), \"date\" (ISO 8601, or null if unknown). If the SMS is not a \
completed transaction, respond with the literal string null. Respond with \
JSON only, no explanations.";

/// Explicit configuration for one pipeline run
///
/// Built from the settings blob via [`PipelineConfig::from_settings`]; every
/// field has a usable default except the API key, whose absence makes the
/// pipeline skip the message.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bearer token for the extraction service; `None` disables processing
    pub api_key: Option<String>,
    pub model: String,
    /// Fully normalized completions URL
    pub endpoint: String,
    /// System prompt sent with every extraction request
    pub prompt_template: String,
    /// Lowercased, deduplicated sender allowlist
    pub sender_keywords: Vec<String>,
    /// Configured wallet to book transactions against
    pub wallet_pk: Option<i64>,
    /// User-supplied exchange-rate overrides, lowercase code -> rate
    pub custom_rates: HashMap<String, f64>,
    /// Cached exchange rates, consulted after the overrides
    pub cached_rates: HashMap<String, f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prompt_template: DEFAULT_PROMPT.to_string(),
            sender_keywords: DEFAULT_SENDER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            wallet_pk: None,
            custom_rates: HashMap::new(),
            cached_rates: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Resolve configuration from the app-settings JSON blob
    ///
    /// Unknown keys are ignored; missing or malformed values fall back to
    /// defaults rather than failing the run.
    pub fn from_settings(settings: &Value) -> Self {
        let api_key = non_empty_str(settings, "openaiApiKey");
        let model = non_empty_str(settings, "openaiModel").unwrap_or_else(|| DEFAULT_MODEL.into());
        let endpoint = non_empty_str(settings, "openaiBaseUrl")
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.into());
        let prompt_template =
            non_empty_str(settings, "smsPromptTemplate").unwrap_or_else(|| DEFAULT_PROMPT.into());

        let sender_keywords = parse_sender_keywords(settings.get("smsSenderKeywords"));
        let wallet_pk = parse_wallet_pk(settings.get("selectedWalletPk"));
        let custom_rates = parse_rate_table(settings.get("customCurrencyAmounts"));
        let cached_rates = parse_rate_table(settings.get("cachedCurrencyExchange"));

        Self {
            api_key,
            model,
            endpoint,
            prompt_template,
            sender_keywords,
            wallet_pk,
            custom_rates,
            cached_rates,
        }
    }
}

/// Normalize a configured base URL into a full completions endpoint
///
/// Forces an https scheme when none is present and ensures the URL ends with
/// the chat-completions path.
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        return DEFAULT_ENDPOINT.to_string();
    }
    if !url.contains("://") {
        url = format!("https://{}", url);
    }
    if !url.ends_with("/chat/completions") {
        if url.ends_with("/v1") {
            url.push_str("/chat/completions");
        } else {
            url.push_str("/v1/chat/completions");
        }
    }
    url
}

fn non_empty_str(settings: &Value, key: &str) -> Option<String> {
    settings
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Sender keywords accept either a JSON list or a delimiter-separated string
fn parse_sender_keywords(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([',', ';'])
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let mut keywords = Vec::new();
    for keyword in raw {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    if keywords.is_empty() {
        DEFAULT_SENDER_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect()
    } else {
        keywords
    }
}

fn parse_wallet_pk(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Rate tables map lowercase currency codes to per-unit rates
fn parse_rate_table(value: Option<&Value>) -> HashMap<String, f64> {
    let Some(Value::Object(map)) = value else {
        return HashMap::new();
    };

    map.iter()
        .filter_map(|(code, rate)| {
            let rate = match rate {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }?;
            Some((code.to_lowercase(), rate))
        })
        .collect()
}
