use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use arena_runner::Agent;
use serde_json::{Map, Value};

use crate::chat::ChatAgent;
use crate::gemini::GeminiAgent;

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    OpenRouter,
    Gemini,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Environment variable holding the API key.
    pub fn key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::OpenRouter => "OpenRouter",
            Provider::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "openrouter" => Ok(Provider::OpenRouter),
            "gemini" | "google" => Ok(Provider::Gemini),
            _ => bail!("unknown provider '{s}' (expected OpenAI, OpenRouter or Gemini)"),
        }
    }
}

/// Everything needed to build one agent.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Name used in records and logs
    pub name: String,
    pub provider: Provider,
    pub model: String,
    pub system_prompt: String,
    /// Extra request parameters (temperature, max_tokens, ...). Merged into
    /// the request body for chat providers and sent as `generationConfig`
    /// for Gemini.
    pub params: Map<String, Value>,
    pub timeout: Duration,
    /// Overrides [`Provider::default_base_url`]
    pub base_url: Option<String>,
}

impl AgentSpec {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: model.clone(),
            provider,
            model,
            system_prompt: String::new(),
            params: Map::new(),
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// API keys by provider.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    openai: Option<String>,
    openrouter: Option<String>,
    gemini: Option<String>,
}

impl Credentials {
    /// Read every provider key from the environment; empty values count as unset.
    pub fn from_env() -> Self {
        let read = |p: Provider| std::env::var(p.key_var()).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai: read(Provider::OpenAi),
            openrouter: read(Provider::OpenRouter),
            gemini: read(Provider::Gemini),
        }
    }

    pub fn with(mut self, provider: Provider, key: impl Into<String>) -> Self {
        *self.slot(provider) = Some(key.into());
        self
    }

    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::OpenRouter => self.openrouter.as_deref(),
            Provider::Gemini => self.gemini.as_deref(),
        }
    }

    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::OpenRouter => &mut self.openrouter,
            Provider::Gemini => &mut self.gemini,
        }
    }
}

/// Build the adapter for `spec`. Fails when the provider's key is missing.
pub fn build_agent(spec: &AgentSpec, credentials: &Credentials) -> anyhow::Result<Box<dyn Agent>> {
    let key = credentials.key_for(spec.provider).with_context(|| {
        format!(
            "{} is not set; it is required for {} agent '{}'",
            spec.provider.key_var(),
            spec.provider,
            spec.name
        )
    })?;

    let agent: Box<dyn Agent> = match spec.provider {
        Provider::OpenAi | Provider::OpenRouter => Box::new(ChatAgent::new(spec, key)?),
        Provider::Gemini => Box::new(GeminiAgent::new(spec, key)?),
    };
    Ok(agent)
}
