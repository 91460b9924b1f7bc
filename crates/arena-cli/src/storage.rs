//! Per-match result directory
//!
//! Layout: `<results>/<white> vs <black>/<match_id>/<game_label>/` with
//! `stepsinfo.json`, `rewards.json`, `game_info.json`, `match.json` and the
//! line log `log.txt`.

use std::fs::{self, File};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use arena_core::MatchRecord;
use arena_runner::MatchSink;
use serde::Serialize;
use tracing::{info, Level};
use uuid::Uuid;

pub const STEPS_FILE: &str = "stepsinfo.json";
pub const REWARDS_FILE: &str = "rewards.json";
pub const GAME_INFO_FILE: &str = "game_info.json";
pub const MATCH_FILE: &str = "match.json";
pub const LOG_FILE: &str = "log.txt";

pub struct RunDirectory {
    root: PathBuf,
    log: LineWriter<File>,
}

impl RunDirectory {
    /// Create the directory for one match and open its log.
    pub fn create(
        results_dir: &Path,
        players: [&str; 2],
        match_id: Uuid,
        game_label: &str,
    ) -> anyhow::Result<Self> {
        let pairing = format!("{} vs {}", path_safe(players[0]), path_safe(players[1]));
        let root = results_dir
            .join(pairing)
            .join(match_id.to_string())
            .join(path_safe(game_label));
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create result directory {}", root.display()))?;

        let log_path = root.join(LOG_FILE);
        let file = File::create(&log_path)
            .with_context(|| format!("failed to create {}", log_path.display()))?;

        Ok(Self {
            root,
            log: LineWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write every JSON artifact for `record`.
    pub fn write_record(&self, record: &MatchRecord) -> anyhow::Result<()> {
        self.write_json(STEPS_FILE, &record.steps_info())?;
        self.write_json(REWARDS_FILE, &record.rewards)?;
        self.write_json(GAME_INFO_FILE, &record.game_info)?;
        self.write_json(MATCH_FILE, record)?;
        info!(dir = %self.root.display(), "match results saved");
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> anyhow::Result<()> {
        let path = self.root.join(name);
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {name}"))?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl MatchSink for RunDirectory {
    fn log(&mut self, level: Level, message: &str) -> anyhow::Result<()> {
        writeln!(self.log, "{level} {message}").context("failed to append to log.txt")
    }

    fn record_match(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        self.log.flush()?;
        self.write_record(record)
    }
}

/// Directory-safe form of an agent name or label (`openai/gpt-4o` -> `openai_gpt-4o`).
pub fn path_safe(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
