use arena_core::TokenUsage;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Text and token usage returned by one agent invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    pub usage: TokenUsage,
}

impl AgentReply {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Transport-level failure of an agent call.
///
/// The resolver never propagates these; a failed call counts as an attempt
/// that produced no text.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Response(String),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Capability every model provider adapter implements: accept a prompt,
/// return text plus token counts.
#[async_trait]
pub trait Agent: Send {
    /// Model or player name used in records and logs
    fn name(&self) -> &str;

    async fn invoke(&mut self, prompt: &str) -> Result<AgentReply, AgentError>;
}
