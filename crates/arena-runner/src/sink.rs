//! Destination for the human-readable match log and sealed records

use arena_core::{MatchRecord, StepRecord};
use tracing::Level;

/// Receives log lines and records as the match progresses.
///
/// Failures are reported back so the orchestrator can warn about them; they
/// never stop a match.
pub trait MatchSink: Send {
    /// One line-oriented entry tagged with a severity.
    fn log(&mut self, level: Level, message: &str) -> anyhow::Result<()>;

    fn record_step(&mut self, _step: &StepRecord) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once with the sealed record, including partial records of
    /// faulted matches.
    fn record_match(&mut self, _record: &MatchRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MatchSink for NullSink {
    fn log(&mut self, _level: Level, _message: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub lines: Vec<(Level, String)>,
    pub steps: Vec<StepRecord>,
    pub record: Option<MatchRecord>,
}

impl MatchSink for MemorySink {
    fn log(&mut self, level: Level, message: &str) -> anyhow::Result<()> {
        self.lines.push((level, message.to_string()));
        Ok(())
    }

    fn record_step(&mut self, step: &StepRecord) -> anyhow::Result<()> {
        self.steps.push(step.clone());
        Ok(())
    }

    fn record_match(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        self.record = Some(record.clone());
        Ok(())
    }
}
