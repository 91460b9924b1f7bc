//! OpenAI-compatible chat completions (OpenAI and OpenRouter)

use std::time::Duration;

use arena_core::TokenUsage;
use arena_runner::{Agent, AgentError, AgentReply};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::http::{self, counter, embedded_error};
use crate::provider::{AgentSpec, Provider};

/// Request keys owned by the adapter; configured params may not replace them.
const RESERVED_KEYS: [&str; 2] = ["model", "messages"];

pub struct ChatAgent {
    name: String,
    provider: Provider,
    model: String,
    system_prompt: String,
    params: Map<String, Value>,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl ChatAgent {
    pub fn new(spec: &AgentSpec, api_key: &str) -> anyhow::Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            provider: spec.provider,
            model: spec.model.clone(),
            system_prompt: spec.system_prompt.clone(),
            params: spec.params.clone(),
            endpoint: format!("{}/chat/completions", spec.base_url()),
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
impl Agent for ChatAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&mut self, prompt: &str) -> Result<AgentReply, AgentError> {
        let body = chat_request_body(&self.model, &self.system_prompt, prompt, &self.params);
        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if self.provider == Provider::OpenRouter {
            request = request.header("X-Title", "llm-chess-arena");
        }

        debug!(agent = %self.name, provider = %self.provider, "sending chat completion");
        let response = http::send_json(request, self.timeout).await?;
        parse_chat_response(&response)
    }
}

/// Request body: configured params, then model and messages.
pub fn chat_request_body(
    model: &str,
    system_prompt: &str,
    prompt: &str,
    params: &Map<String, Value>,
) -> Value {
    let mut body = Map::new();
    for (key, value) in params {
        if RESERVED_KEYS.contains(&key.as_str()) {
            warn!(param = %key, "ignoring reserved request parameter");
            continue;
        }
        body.insert(key.clone(), value.clone());
    }

    let mut messages = Vec::new();
    if !system_prompt.is_empty() {
        messages.push(json!({ "role": "system", "content": system_prompt }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));

    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert("messages".to_string(), Value::Array(messages));
    Value::Object(body)
}

/// Text of the first choice plus usage counters. Missing counters are zero;
/// a missing total is the sum of the other two.
pub fn parse_chat_response(body: &Value) -> Result<AgentReply, AgentError> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| {
            AgentError::Response(
                embedded_error(body).unwrap_or_else(|| "response has no choices".to_string()),
            )
        })?;

    let text = match choice.pointer("/message/content") {
        Some(Value::String(s)) => s.clone(),
        // some routers return content as a list of typed parts
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };

    let usage = body.get("usage");
    let input = counter(usage, "prompt_tokens");
    let output = counter(usage, "completion_tokens");
    let total = usage
        .and_then(|u| u.get("total_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(input + output);

    Ok(AgentReply::new(text, TokenUsage::new(input, output, total)))
}
