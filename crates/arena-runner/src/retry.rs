//! How the prompt changes between attempts within one turn

use arena_core::{ArenaError, PromptTemplate, Side};
use tracing::warn;

pub const RETRY_PH_ATTEMPT: &str = "attempt";
pub const RETRY_PH_ROLE: &str = "role";

/// Appended to the prompt after a rejected attempt when augmentation is on.
pub const DEFAULT_RETRY_TEMPLATE: &str = "Attempt {attempt} failed, please remember that you are \
acting as {role} in the chess game, and you need to make a valid move from the last valid moves \
list. Return the move in the format [UCI_MOVE], for example [e2e4].";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Re-send the identical prompt
    #[default]
    Resend,
    /// Append a rendered note about the failed attempt to the previous prompt
    Augment { template: PromptTemplate },
}

impl RetryStrategy {
    /// Augmentation with [`DEFAULT_RETRY_TEMPLATE`].
    pub fn augmenting() -> Self {
        Self::augment(DEFAULT_RETRY_TEMPLATE).unwrap_or_default()
    }

    /// Augmentation with a custom note. `{attempt}` and `{role}` are the only
    /// placeholders accepted.
    pub fn augment(template: &str) -> Result<Self, ArenaError> {
        let template =
            PromptTemplate::parse(template, &[RETRY_PH_ATTEMPT, RETRY_PH_ROLE], &[])?;
        Ok(Self::Augment { template })
    }

    pub fn is_augmenting(&self) -> bool {
        matches!(self, Self::Augment { .. })
    }

    /// Prompt for the attempt after `failed_attempt` (1-based).
    pub fn next_prompt(&self, prompt: &str, failed_attempt: u32, side: Side) -> String {
        match self {
            Self::Resend => prompt.to_string(),
            Self::Augment { template } => {
                let attempt = failed_attempt.to_string();
                match template.render(&[(RETRY_PH_ATTEMPT, &attempt), (RETRY_PH_ROLE, side.label())]) {
                    Ok(note) => format!("{prompt}\n\n{note}"),
                    Err(e) => {
                        warn!(error = %e, "retry note could not be rendered; re-sending prompt");
                        prompt.to_string()
                    }
                }
            }
        }
    }
}
