//! Tournament command - round-robin between agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), run_with_progress(), report_standings()
//! - Level 4: progress bar and formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use ringwars_core::AgentKind;
use ringwars_tournament::{
    dedup_roster, export_csv, run_tournament_with, schedule, MatchConfig, TournamentConfig, TournamentResult,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Match config JSON file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Agents to enter (default: the full roster)
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<AgentKind>,

    /// Matches per pair
    #[arg(long)]
    pub matches: Option<u32>,

    /// Skip the reversed match per pair
    #[arg(long)]
    pub no_reverse: bool,

    /// Run matches one after another
    #[arg(long)]
    pub sequential: bool,

    /// Keep agent memory across matches (implies --sequential)
    #[arg(long)]
    pub tournament_memory: bool,

    /// Write results as CSV
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// 1. Build the tournament config and roster
/// 2. Play every scheduled match
/// 3. Report standings and export results
pub fn run(args: TournamentArgs) -> Result<()> {
    let config = build_config(&args)?;
    let roster = if args.agents.is_empty() {
        AgentKind::ALL.to_vec()
    } else {
        dedup_roster(&args.agents)
    };
    if roster.len() < 2 {
        bail!("A tournament needs at least two distinct agents, got {}", roster.len());
    }

    let result = run_with_progress(&roster, &config, args.quiet);
    report_standings(&result);

    if let Some(path) = &args.export {
        export_csv(path, &result.results)?;
        println!("\nResults written to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &TournamentArgs) -> Result<TournamentConfig> {
    let mut match_config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(n) = args.matches {
        match_config.matches_per_pair = n;
    }
    if args.no_reverse {
        match_config.reverse_matches = false;
    }
    if let Some(seed) = args.seed {
        match_config.seed = Some(seed);
    }

    let mut config = TournamentConfig::new(match_config);
    if args.sequential {
        config = config.sequential();
    }
    if args.tournament_memory {
        config = config.with_tournament_memory();
    }
    Ok(config)
}

fn run_with_progress(roster: &[AgentKind], config: &TournamentConfig, quiet: bool) -> TournamentResult {
    let total = schedule(roster, &config.match_config).len() as u64;
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        progress_bar(total)
    };

    let result = run_tournament_with(roster, config, |_| pb.inc(1));
    pb.finish_and_clear();
    result
}

fn report_standings(result: &TournamentResult) {
    println!("\n=== Tournament Standings ===");
    println!("{:<4} {:<18} {:>5} {:>7} {:>7} {:>8} {:>10}", "#", "Agent", "Wins", "Losses", "Played", "Win %", "Avg ms");
    for (rank, s) in result.ranked().iter().enumerate() {
        println!(
            "{:<4} {:<18} {:>5} {:>7} {:>7} {:>7.1}% {:>10.1}",
            rank + 1,
            s.name,
            s.wins,
            s.losses,
            s.matches,
            s.win_rate() * 100.0,
            s.mean_duration_ms()
        );
    }

    let errors = result.error_count();
    if errors > 0 {
        println!("\n{} of {} matches ended in an error", errors, result.results.len());
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
