use std::time::Duration;

use anyhow::Context;
use arena_runner::AgentError;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

const USER_AGENT: &str = concat!("llm-chess-arena/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Send `request` and decode a JSON body, mapping failures onto [`AgentError`].
pub(crate) async fn send_json(request: RequestBuilder, timeout: Duration) -> Result<Value, AgentError> {
    let response = request.send().await.map_err(|e| transport(e, timeout))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(e, timeout))?;

    if !status.is_success() {
        return Err(AgentError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| AgentError::Response(format!("invalid JSON body: {e}")))
}

fn transport(e: reqwest::Error, timeout: Duration) -> AgentError {
    if e.is_timeout() {
        AgentError::Timeout(timeout)
    } else {
        AgentError::Transport(anyhow::Error::new(e).context("request to model provider failed"))
    }
}

/// Non-negative counter at `key`, zero when absent.
pub(crate) fn counter(obj: Option<&Value>, key: &str) -> u64 {
    obj.and_then(|o| o.get(key)).and_then(Value::as_u64).unwrap_or(0)
}

/// Provider error message embedded in a 200 body, if any.
pub(crate) fn embedded_error(body: &Value) -> Option<String> {
    let err = body.get("error")?;
    Some(
        err.get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string()),
    )
}
