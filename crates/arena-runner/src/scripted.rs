//! Agent that replays a fixed list of replies, for dry runs and tests.

use std::collections::VecDeque;

use arena_core::TokenUsage;
use async_trait::async_trait;

use crate::agent::{Agent, AgentError, AgentReply};

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String, TokenUsage),
    /// Simulated transport failure
    Fail(String),
}

/// Replays its script in order, then repeats the final entry forever.
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    name: String,
    script: VecDeque<Scripted>,
    prompts: Vec<String>,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>, script: Vec<Scripted>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            prompts: Vec::new(),
        }
    }

    /// Always answers `text` with the given usage.
    pub fn repeating(name: impl Into<String>, text: &str, usage: TokenUsage) -> Self {
        Self::new(name, vec![Scripted::Reply(text.to_string(), usage)])
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn calls(&self) -> usize {
        self.prompts.len()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&mut self, prompt: &str) -> Result<AgentReply, AgentError> {
        self.prompts.push(prompt.to_string());

        let next = if self.script.len() > 1 {
            self.script.pop_front()
        } else {
            self.script.front().cloned()
        };

        match next {
            Some(Scripted::Reply(text, usage)) => Ok(AgentReply::new(text, usage)),
            Some(Scripted::Fail(msg)) => Err(AgentError::Transport(anyhow::anyhow!(msg))),
            None => Ok(AgentReply::default()),
        }
    }
}
