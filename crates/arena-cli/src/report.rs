//! Comparison report across stored runs

use std::path::{Path, PathBuf};

use anyhow::Context;
use arena_core::{MatchRecord, MatchStatus, Rewards};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::MATCH_FILE;

/// One stored match, reduced to what runs are compared on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub path: PathBuf,
    pub match_id: String,
    pub game_label: String,
    pub white: String,
    pub black: String,
    pub status: MatchStatus,
    pub reason: String,
    pub steps: usize,
    pub fallbacks: usize,
    pub total_tokens: u64,
    pub agent_time_secs: f64,
    pub rewards: Rewards,
}

impl RunSummary {
    pub fn from_record(path: PathBuf, record: &MatchRecord) -> Self {
        Self {
            path,
            match_id: record.match_id.to_string(),
            game_label: record.game_label.clone(),
            white: record.players[0].clone(),
            black: record.players[1].clone(),
            status: record.status,
            reason: record.game_info.reason.clone(),
            steps: record.steps.len(),
            fallbacks: record.fallback_count(),
            total_tokens: record.total_usage().total,
            agent_time_secs: record.total_agent_time_secs,
            rewards: record.rewards.clone(),
        }
    }

    /// Short outcome such as `1-0`, `0-1`, `1/2-1/2` or `*` for no result.
    pub fn score(&self) -> &'static str {
        match (self.status, self.rewards.get(&0).copied().unwrap_or(0)) {
            (MatchStatus::Decided, r) if r > 0 => "1-0",
            (MatchStatus::Decided, r) if r < 0 => "0-1",
            (MatchStatus::Decided, _) => "1/2-1/2",
            _ => "*",
        }
    }
}

pub fn load_record(path: &Path) -> anyhow::Result<MatchRecord> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Summaries of every `match.json` under `results_dir`, ranked.
/// Files that cannot be read are skipped with a warning.
pub fn collect_runs(results_dir: &Path) -> anyhow::Result<Vec<RunSummary>> {
    let pattern = format!("{}/**/{MATCH_FILE}", results_dir.display());
    let mut runs = Vec::new();
    for path in glob::glob(&pattern).context("invalid results directory pattern")? {
        let path = match path {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        match load_record(&path) {
            Ok(record) => runs.push(RunSummary::from_record(path, &record)),
            Err(e) => warn!(error = %e, "skipping stored run"),
        }
    }
    rank_runs(&mut runs);
    Ok(runs)
}

/// Fewest fallbacks first, then least agent time.
pub fn rank_runs(runs: &mut [RunSummary]) {
    runs.sort_by(|a, b| {
        a.fallbacks
            .cmp(&b.fallbacks)
            .then_with(|| a.agent_time_secs.total_cmp(&b.agent_time_secs))
    });
}

pub fn generate_report(runs: &[RunSummary]) -> String {
    let mut report = String::new();
    report.push_str(&format!("=== Stored runs: {} ===\n\n", runs.len()));
    if runs.is_empty() {
        report.push_str("No runs found.\n");
        return report;
    }

    report.push_str(&format!(
        "{:<4} {:<28} {:<28} {:<8} {:<9} {:>5} {:>9} {:>10} {:>10}\n",
        "#", "White", "Black", "Result", "Status", "Steps", "Fallbacks", "Tokens", "Time (s)"
    ));
    report.push_str(&"-".repeat(121));
    report.push('\n');

    for (rank, run) in runs.iter().enumerate() {
        report.push_str(&format!(
            "{:<4} {:<28} {:<28} {:<8} {:<9} {:>5} {:>9} {:>10} {:>10.1}\n",
            rank + 1,
            truncate(&run.white, 28),
            truncate(&run.black, 28),
            run.score(),
            run.status.to_string(),
            run.steps,
            run.fallbacks,
            run.total_tokens,
            run.agent_time_secs
        ));
    }

    report
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width - 1).collect();
        format!("{kept}~")
    }
}
