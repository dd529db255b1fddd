//! Google Gemini completion provider.
//!
//! Talks to the Gemini `generateContent` REST endpoint. System messages are
//! folded into `systemInstruction`; assistant turns are sent with the `model`
//! role. A single attempt is made per call: failures propagate to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, LLMMessage, MessageRole};
use crate::utilities::errors::{CrewError, Result};

/// Base URL of the Gemini API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn to_json(&self) -> Value {
        let mut config = serde_json::Map::new();
        if let Some(temp) = self.temperature {
            config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(top_p) = self.top_p {
            config.insert("topP".to_string(), serde_json::json!(top_p));
        }
        if let Some(top_k) = self.top_k {
            config.insert("topK".to_string(), serde_json::json!(top_k));
        }
        if let Some(max_tokens) = self.max_output_tokens {
            config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        Value::Object(config)
    }
}

/// Gemini completion client.
#[derive(Debug, Clone)]
pub struct GeminiCompletion {
    model: String,
    api_key: String,
    base_url: String,
    pub generation_config: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiCompletion {
    /// Create a client for `model` with a per-request timeout.
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            generation_config: GenerationConfig::default(),
            client,
        })
    }

    /// Replace the sampling parameters.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the `generateContent` request body.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => system_parts.push(&msg.content),
                MessageRole::User | MessageRole::Assistant => {
                    let role = if msg.role == MessageRole::Assistant {
                        "model"
                    } else {
                        "user"
                    };
                    contents.push(serde_json::json!({
                        "role": role,
                        "parts": [{ "text": msg.content }],
                    }));
                }
            }
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": self.generation_config.to_json(),
        });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_parts.join("\n\n") }]
            });
        }

        body
    }

    /// Extract the concatenated text parts of the first candidate.
    pub fn parse_response(response: &Value) -> Result<String> {
        if let Some(error) = response.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Gemini API error");
            return Err(CrewError::Llm(format!("Gemini API error: {}", msg)));
        }

        let candidate = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| CrewError::Llm("No candidates in Gemini response".to_string()))?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                let reason = candidate
                    .get("finishReason")
                    .and_then(|r| r.as_str())
                    .unwrap_or("unknown");
                CrewError::Llm(format!(
                    "No content.parts in Gemini response (finishReason: {})",
                    reason
                ))
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        Ok(text)
    }
}

#[async_trait]
impl BaseLLM for GeminiCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    async fn call(&self, messages: Vec<LLMMessage>) -> Result<String> {
        log::debug!(
            "GeminiCompletion.call: model={}, messages={}",
            self.model,
            messages.len()
        );

        let body = self.build_request_body(&messages);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(CrewError::Llm(format!(
                "Gemini API error ({}): {}",
                status,
                truncate(&response_text, 500)
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            CrewError::Llm(format!(
                "Failed to parse Gemini response: {} - Body: {}",
                e,
                truncate(&response_text, 500)
            ))
        })?;

        if let Some(usage) = response_json.get("usageMetadata") {
            log::debug!("Gemini usage: {}", usage);
        }

        Self::parse_response(&response_json)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiCompletion {
        GeminiCompletion::new("gemini-2.0-flash", "test-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_body_maps_roles() {
        let llm = client().with_generation_config(GenerationConfig {
            temperature: Some(0.7),
            top_p: Some(1.0),
            top_k: Some(32),
            max_output_tokens: Some(2048),
        });
        let body = llm.build_request_body(&[
            LLMMessage::system("You are a poet."),
            LLMMessage::user("Write a haiku"),
            LLMMessage::assistant("Waves fold into foam"),
            LLMMessage::user("Another"),
        ]);

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a poet."
        );
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Waves fold into foam");
        assert_eq!(body["generationConfig"]["topK"], 32);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_request_body_without_system() {
        let body = client().build_request_body(&[LLMMessage::user("hi")]);
        assert!(body.get("systemInstruction").is_none());
        assert_eq!(body["generationConfig"], serde_json::json!({}));
    }

    #[test]
    fn test_endpoint_uses_base_url() {
        let llm = client().with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            llm.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let response = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }
            }]
        });
        assert_eq!(
            GeminiCompletion::parse_response(&response).unwrap(),
            "Hello, world"
        );
    }

    #[test]
    fn test_parse_response_errors() {
        let api_error = serde_json::json!({ "error": { "message": "quota exceeded" } });
        let err = GeminiCompletion::parse_response(&api_error).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));

        let blocked = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = GeminiCompletion::parse_response(&blocked).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let empty = serde_json::json!({ "candidates": [] });
        assert!(GeminiCompletion::parse_response(&empty).is_err());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
