//! Google Gemini `generateContent`

use std::time::Duration;

use arena_core::TokenUsage;
use arena_runner::{Agent, AgentError, AgentReply};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::http::{self, counter, embedded_error};
use crate::provider::AgentSpec;

pub struct GeminiAgent {
    name: String,
    system_prompt: String,
    generation_config: Map<String, Value>,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl GeminiAgent {
    pub fn new(spec: &AgentSpec, api_key: &str) -> anyhow::Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            system_prompt: spec.system_prompt.clone(),
            generation_config: spec.params.clone(),
            endpoint: format!("{}/models/{}:generateContent", spec.base_url(), spec.model),
            api_key: api_key.to_string(),
            timeout: spec.timeout,
            client: http::client(spec.timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&mut self, prompt: &str) -> Result<AgentReply, AgentError> {
        let body = gemini_request_body(&self.system_prompt, prompt, &self.generation_config);
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        debug!(agent = %self.name, "sending generateContent");
        let response = http::send_json(request, self.timeout).await?;
        parse_gemini_response(&response)
    }
}

pub fn gemini_request_body(
    system_prompt: &str,
    prompt: &str,
    generation_config: &Map<String, Value>,
) -> Value {
    let mut body = Map::new();
    if !system_prompt.is_empty() {
        body.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": system_prompt }] }),
        );
    }
    body.insert(
        "contents".to_string(),
        json!([{ "role": "user", "parts": [{ "text": prompt }] }]),
    );
    if !generation_config.is_empty() {
        body.insert(
            "generationConfig".to_string(),
            Value::Object(generation_config.clone()),
        );
    }
    Value::Object(body)
}

/// Concatenated text parts of the first candidate plus `usageMetadata`.
pub fn parse_gemini_response(body: &Value) -> Result<AgentReply, AgentError> {
    let Some(candidate) = body.get("candidates").and_then(|c| c.get(0)) else {
        let reason = body
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .map(|r| format!("prompt blocked: {r}"))
            .or_else(|| embedded_error(body))
            .unwrap_or_else(|| "response has no candidates".to_string());
        return Err(AgentError::Response(reason));
    };

    let text = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = body.get("usageMetadata");
    let input = counter(usage, "promptTokenCount");
    let output = counter(usage, "candidatesTokenCount");
    let total = usage
        .and_then(|u| u.get("totalTokenCount"))
        .and_then(Value::as_u64)
        .unwrap_or(input + output);

    Ok(AgentReply::new(text, TokenUsage::new(input, output, total)))
}
