//! Evaluation commands - analysis of one agent, benchmark and quick check
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_analysis(), run_benchmark(), run_quick() - orchestration
//! - Level 2: build_config(), print_* reports
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use ringwars_core::AgentKind;
use ringwars_tournament::{
    analyze_agent, run_benchmark as benchmark, run_quick_check, AgentAnalysis, MatchConfig, MatchResult,
    ANALYSIS_MATCHES, ANALYSIS_OPPONENTS, BENCHMARK_AGENTS, QUICK_AGENTS,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Match settings shared by the evaluation commands
#[derive(Args)]
pub struct SuiteArgs {
    /// Match config JSON file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct AnalysisArgs {
    /// Agent to analyse
    pub agent: AgentKind,

    /// Opponents (default: random, defensive, aggressive, strategic, learning)
    #[arg(long, value_delimiter = ',')]
    pub opponents: Vec<AgentKind>,

    /// Matches against each opponent
    #[arg(long, default_value_t = ANALYSIS_MATCHES)]
    pub matches: u32,

    #[arg(long)]
    pub max_turns: Option<u32>,

    #[command(flatten)]
    pub suite: SuiteArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run_analysis(args: AnalysisArgs) -> Result<()> {
    let mut config = build_config(&args.suite)?;
    if let Some(n) = args.max_turns {
        config.max_turns = n;
    }
    let opponents = if args.opponents.is_empty() {
        ANALYSIS_OPPONENTS.to_vec()
    } else {
        args.opponents.clone()
    };

    println!("Running detailed analysis for: {}", args.agent);
    let analysis = analyze_agent(args.agent, &opponents, args.matches, &config, |_| {});
    if analysis.total_matches() == 0 {
        bail!("No opponents left to play against {}", args.agent);
    }
    print_analysis(&analysis);
    Ok(())
}

pub fn run_benchmark(args: SuiteArgs) -> Result<()> {
    let config = build_config(&args)?;
    println!("Running benchmark matches...");
    let report = benchmark(&BENCHMARK_AGENTS, &config, |result| {
        println!(
            "{} vs {}: {} ({}ms)",
            result.first,
            result.second,
            winner_of(result),
            result.duration_ms
        );
    });
    println!("\nBenchmark completed in {}ms", report.total_ms);
    Ok(())
}

pub fn run_quick(args: SuiteArgs) -> Result<()> {
    let config = build_config(&args)?;
    println!("Running quick agent checks...");
    let checks = run_quick_check(&QUICK_AGENTS, &config);
    for check in &checks {
        if check.passed {
            println!("{:<18} PASS", check.agent);
        } else {
            println!(
                "{:<18} FAIL: {}",
                check.agent,
                check.result.error.as_deref().unwrap_or("error")
            );
        }
    }

    let passed = checks.iter().filter(|c| c.passed).count();
    println!("\nQuick check: {}/{} agents passed", passed, checks.len());
    if passed < checks.len() {
        bail!("{} agents failed the quick check", checks.len() - passed);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &SuiteArgs) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn print_analysis(analysis: &AgentAnalysis) {
    println!("\n=== AGENT ANALYSIS: {} ===", analysis.target);
    for record in &analysis.records {
        println!("\nVs {}:", record.opponent);
        for (i, result) in record.results.iter().enumerate() {
            println!(
                "  Match {}: {} ({}, {} turns, {}ms)",
                i + 1,
                if result.won_by(&analysis.target) { "WIN" } else { "LOSS" },
                result.end_reason,
                result.final_turn,
                result.duration_ms
            );
        }
        println!(
            "  Result: {}/{} wins ({:.1}%)",
            record.wins,
            record.matches(),
            record.win_rate() * 100.0
        );
    }

    println!("\n=== SUMMARY ===");
    println!(
        "Overall: {}/{} wins ({:.1}%)",
        analysis.total_wins(),
        analysis.total_matches(),
        analysis.win_rate() * 100.0
    );
    println!("Average match time: {:.0}ms", analysis.mean_duration_ms());
    println!("Performance: {}", analysis.rating());
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn winner_of(result: &MatchResult) -> &str {
    result.winner.as_deref().unwrap_or("Error")
}
