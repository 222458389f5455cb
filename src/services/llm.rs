//! LLM client
//!
//! Calls the Gemini generateContent endpoint and normalizes whatever shape
//! comes back into plain text. The client is optional at runtime: without
//! an API key every call returns [`LlmError::NotConfigured`] and the
//! generator falls back to templates.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_BASE: &str = "https://generativelanguage.googleapis.com";

/// Response fields tried, in order, when extracting generated text.
const OUTPUT_KEYS: &[&str] = &[
    "output",
    "result",
    "text",
    "response",
    "generated_text",
    "content",
    "message",
    "data",
];
const NESTED_KEYS: &[&str] = &["text", "content", "message", "output"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm api key not configured")]
    NotConfigured,
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm returned {0}")]
    Status(reqwest::StatusCode),
}

/// Sampling parameters per write-back mode. README rewrites want low
/// temperature and room for a full section; comments stay short.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub fn for_readme() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 2000,
        }
    }

    pub fn for_comment() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: DEFAULT_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a prompt and return the raw response object. The generated
    /// text is wrapped as `{"output": "..."}` so callers go through
    /// [`extract_text`] uniformly.
    pub async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Value, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_output_tokens,
            }
        });

        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(LlmError::Status(resp.status()));
        }
        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();
        debug!(chars = text.len(), "llm response received");
        Ok(json!({ "output": text }))
    }
}

/// Pull usable text out of an arbitrary response object. Tries the known
/// top-level keys, then one level of nesting, then stringifies whatever
/// is there. Total: always returns a string, possibly empty.
pub fn extract_text(response: &Value) -> String {
    match response {
        Value::String(s) => return s.clone(),
        Value::Object(map) => {
            for key in OUTPUT_KEYS {
                if let Some(v) = map.get(*key) {
                    match v {
                        Value::String(s) if !s.is_empty() => return s.clone(),
                        Value::Object(inner) => {
                            for nested in NESTED_KEYS {
                                if let Some(Value::String(s)) = inner.get(*nested) {
                                    if !s.is_empty() {
                                        return s.clone();
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        _ => {}
    }
    if response.is_null() {
        String::new()
    } else {
        response.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_without_key_is_not_configured() {
        let client = LlmClient::with_base_url(None, "gemini-1.5-flash".into(), "http://localhost:1".into());
        let err = client
            .generate("hi", GenerationParams::for_comment())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }

    #[test]
    fn extract_text_prefers_output_key() {
        let v = json!({"output": "hello", "text": "ignored"});
        assert_eq!(extract_text(&v), "hello");
    }

    #[test]
    fn extract_text_falls_through_empty_strings() {
        let v = json!({"output": "", "result": "from result"});
        assert_eq!(extract_text(&v), "from result");
    }

    #[test]
    fn extract_text_handles_nested_objects() {
        let v = json!({"response": {"content": "nested"}});
        assert_eq!(extract_text(&v), "nested");
    }

    #[test]
    fn extract_text_stringifies_unknown_shapes() {
        let v = json!({"weird": [1, 2]});
        assert_eq!(extract_text(&v), v.to_string());
        assert_eq!(extract_text(&Value::Null), "");
    }

    #[test]
    fn params_differ_by_mode() {
        let readme = GenerationParams::for_readme();
        let comment = GenerationParams::for_comment();
        assert!(readme.temperature < comment.temperature);
        assert!(readme.max_output_tokens > comment.max_output_tokens);
    }
}
