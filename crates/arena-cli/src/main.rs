//! Arena CLI
//!
//! Play LLM-vs-LLM chess matches and compare stored runs.

use std::path::PathBuf;

use anyhow::Context;
use arena_cli::{
    collect_runs, generate_report, ArenaConfig, RunDirectory, DEFAULT_CONFIG_PATH,
    DEFAULT_RESULTS_DIR,
};
use arena_core::{ChessEnv, RulesEngine};
use arena_runner::{seat_players, MatchOrchestrator, Seat};
use clap::{Parser, Subcommand};
use llm_agents::{build_agent, Credentials};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Run chess matches between language models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one match described by a configuration file
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Seed for fallback moves (overrides [game] seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Turn ceiling, 0 for none (overrides [game] stop_after)
        #[arg(long)]
        stop_after: Option<usize>,

        /// Where result directories are created (overrides [game] results_dir)
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },
    /// Rank stored runs by fallback count, then agent time
    Report {
        #[arg(default_value = DEFAULT_RESULTS_DIR)]
        results_dir: PathBuf,

        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Run {
            config,
            seed,
            stop_after,
            results_dir,
        } => run_match(config, seed, stop_after, results_dir).await,
        Command::Report { results_dir, json } => show_report(results_dir, json),
    }
}

async fn run_match(
    config_path: PathBuf,
    seed: Option<u64>,
    stop_after: Option<usize>,
    results_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ArenaConfig::load(&config_path)?;
    if let Some(seed) = seed {
        config.game.seed = Some(seed);
    }
    if let Some(limit) = stop_after {
        config.game.stop_after = limit;
    }
    if let Some(dir) = results_dir {
        config.game.results_dir = dir;
    }

    let credentials = Credentials::from_env();
    let [spec0, spec1] = config.agent_specs()?;
    let [template0, template1] = config.templates()?;
    let mut seats = [
        Seat::new(build_agent(&spec0, &credentials)?, template0),
        Seat::new(build_agent(&spec1, &credentials)?, template1),
    ];

    let mut engine = match &config.game.fen {
        Some(fen) => ChessEnv::from_fen(fen).context("invalid [game] fen")?,
        None => ChessEnv::new(),
    };

    let match_config = config.match_config()?;
    let [white, black] = seat_players(
        [spec0.name.as_str(), spec1.name.as_str()],
        match_config.first_mover,
        engine.first_side(),
    );
    let mut run_dir = RunDirectory::create(
        &config.game.results_dir,
        [white.as_str(), black.as_str()],
        match_config.match_id,
        &match_config.game_label,
    )?;

    let mut rng = match config.game.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(
        match_id = %match_config.match_id,
        white = %white,
        black = %black,
        dir = %run_dir.path().display(),
        "starting match"
    );

    let orchestrator = MatchOrchestrator::new(match_config);
    let abort = orchestrator.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current turn");
            abort.abort();
        }
    });

    match orchestrator
        .run(&mut engine, &mut seats, &mut rng, &mut run_dir)
        .await
    {
        Ok(record) => {
            let usage = record.total_usage();
            println!();
            println!("=== {white} vs {black} ===");
            println!("Status:    {}", record.status);
            println!("Outcome:   {}", record.game_info.reason);
            println!("Turns:     {}", record.steps.len());
            println!("Fallbacks: {}", record.fallback_count());
            println!("Tokens:    {} in / {} out / {} total", usage.input, usage.output, usage.total);
            println!("Time:      {:.1}s", record.total_agent_time_secs);
            println!("Saved to:  {}", run_dir.path().display());
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial() {
                eprintln!(
                    "Partial record with {} turns saved to {}",
                    partial.steps.len(),
                    run_dir.path().display()
                );
            }
            Err(e.into())
        }
    }
}

fn show_report(results_dir: PathBuf, json: bool) -> anyhow::Result<()> {
    let runs = collect_runs(&results_dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else {
        println!("{}", generate_report(&runs));
    }
    Ok(())
}
