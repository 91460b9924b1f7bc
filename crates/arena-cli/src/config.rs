//! Match configuration file (`arena.toml`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use arena_core::{PromptTemplate, DEFAULT_HISTORY_WINDOW};
use arena_runner::{MatchConfig, RetryStrategy, DEFAULT_RETRIES, DEFAULT_STOP_AFTER};
use llm_agents::{AgentSpec, Provider, DEFAULT_TIMEOUT};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_CONFIG_PATH: &str = "arena.toml";
pub const DEFAULT_RESULTS_DIR: &str = "Results";
pub const DEFAULT_GAME_LABEL: &str = "game_1";

/// Step prompt used when an agent table does not set one.
pub const DEFAULT_STEP_PROMPT: &str = "You are playing chess as {role}.

Board:
{board}

Pieces:
{piece_positions}

Recent moves:
{history}

Valid moves: {valid_moves}

Pick one move from the valid moves list and end your answer with it in square brackets, for example [e2e4].";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaConfig {
    #[serde(default)]
    pub game: GameSection,
    pub agent0: AgentSection,
    pub agent1: AgentSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSection {
    /// Turn ceiling; 0 plays until the game ends
    pub stop_after: usize,
    pub history_window: usize,
    /// Attempts per turn before the random fallback
    pub retries: u32,
    /// Append a note to the prompt after a rejected attempt
    pub augment_retries: bool,
    /// Custom retry note (`{attempt}`, `{role}`); implies `augment_retries`
    pub retry_prompt: Option<String>,
    pub seed: Option<u64>,
    /// Agent table (0 or 1) that moves first
    pub first_mover: usize,
    pub results_dir: PathBuf,
    pub game_label: String,
    /// Start position; standard initial position when unset
    pub fen: Option<String>,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            stop_after: DEFAULT_STOP_AFTER,
            history_window: DEFAULT_HISTORY_WINDOW,
            retries: DEFAULT_RETRIES,
            augment_retries: false,
            retry_prompt: None,
            seed: None,
            first_mover: 0,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            game_label: DEFAULT_GAME_LABEL.to_string(),
            fen: None,
        }
    }
}

impl GameSection {
    pub fn retry_strategy(&self) -> anyhow::Result<RetryStrategy> {
        match &self.retry_prompt {
            Some(note) => RetryStrategy::augment(note).context("invalid [game] retry_prompt"),
            None if self.augment_retries => Ok(RetryStrategy::augmenting()),
            None => Ok(RetryStrategy::Resend),
        }
    }

    pub fn stop_after(&self) -> Option<usize> {
        (self.stop_after > 0).then_some(self.stop_after)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSection {
    pub provider: String,
    pub model: String,
    /// Display name; defaults to the model
    pub name: Option<String>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default = "default_step_prompt")]
    pub step_prompt: String,
    /// Provider request parameters (temperature, max_tokens, ...)
    #[serde(default)]
    pub params: Map<String, Value>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

fn default_step_prompt() -> String {
    DEFAULT_STEP_PROMPT.to_string()
}

impl AgentSection {
    pub fn spec(&self) -> anyhow::Result<AgentSpec> {
        let provider: Provider = self.provider.parse()?;
        let mut spec = AgentSpec::new(provider, &self.model);
        if let Some(name) = &self.name {
            spec.name = name.clone();
        }
        spec.system_prompt = self.system_prompt.clone();
        spec.params = self.params.clone();
        spec.timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        spec.base_url = self.base_url.clone();
        Ok(spec)
    }

    pub fn template(&self) -> anyhow::Result<PromptTemplate> {
        Ok(PromptTemplate::step(&self.step_prompt)?)
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse and validate. Every error a match could hit at setup is raised here.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.game.retries == 0 {
            bail!("[game] retries must be at least 1");
        }
        if self.game.first_mover > 1 {
            bail!("[game] first_mover must be 0 or 1, got {}", self.game.first_mover);
        }
        if self.game.game_label.trim().is_empty() {
            bail!("[game] game_label must not be empty");
        }
        self.game.retry_strategy()?;
        for (table, agent) in self.agents() {
            agent.spec().with_context(|| format!("[{table}]"))?;
            agent
                .template()
                .with_context(|| format!("[{table}] step_prompt"))?;
        }
        Ok(())
    }

    fn agents(&self) -> [(&'static str, &AgentSection); 2] {
        [("agent0", &self.agent0), ("agent1", &self.agent1)]
    }

    pub fn agent_specs(&self) -> anyhow::Result<[AgentSpec; 2]> {
        Ok([self.agent0.spec()?, self.agent1.spec()?])
    }

    pub fn templates(&self) -> anyhow::Result<[PromptTemplate; 2]> {
        Ok([self.agent0.template()?, self.agent1.template()?])
    }

    /// Orchestrator settings with a fresh match id.
    pub fn match_config(&self) -> anyhow::Result<MatchConfig> {
        Ok(MatchConfig {
            match_id: Uuid::new_v4(),
            game_label: self.game.game_label.clone(),
            stop_after: self.game.stop_after(),
            history_window: self.game.history_window,
            retries: self.game.retries,
            retry_strategy: self.game.retry_strategy()?,
            first_mover: self.game.first_mover,
        })
    }
}
