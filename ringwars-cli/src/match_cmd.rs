//! Match command - play one match between two agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_result()
//! - Level 3: print_text_result(), print_json_result()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ringwars_core::AgentKind;
use ringwars_tournament::{run_match, EndReason, MatchConfig, MatchResult};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Agent playing the first side
    pub first: AgentKind,

    /// Agent playing the second side
    pub second: AgentKind,

    /// Match config JSON file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub ring_size: Option<usize>,

    #[arg(long)]
    pub max_turns: Option<u32>,

    #[arg(long)]
    pub starting_soldiers: Option<u32>,

    /// Ring steps each side can see beyond its own nodes
    #[arg(long)]
    pub visibility: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build the match config
/// 2. Play the match
/// 3. Report the result
pub fn run(args: MatchArgs) -> Result<()> {
    let config = build_config(&args)?;

    tracing::info!(
        "Starting match: {} vs {} (ring {}, {} turns)",
        args.first,
        args.second,
        config.ring_size,
        config.max_turns
    );

    let result = run_match(args.first, args.second, &config, config.base_seed());
    report_result(&result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &MatchArgs) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(n) = args.ring_size {
        config.ring_size = n;
    }
    if let Some(n) = args.max_turns {
        config.max_turns = n;
    }
    if let Some(n) = args.starting_soldiers {
        config.starting_soldiers = n;
    }
    if let Some(n) = args.visibility {
        config.visibility_range = n;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn report_result(result: &MatchResult, json: bool) -> Result<()> {
    if json {
        print_json_result(result)
    } else {
        print_text_result(result);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_json_result(result: &MatchResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn print_text_result(result: &MatchResult) {
    println!("\n=== Match Result ===");
    println!("First:   {}", result.first);
    println!("Second:  {}", result.second);
    println!("Winner:  {}", result.winner.as_deref().unwrap_or("-"));
    println!("Reason:  {}", result.end_reason);
    println!("Turns:   {}", result.final_turn);
    println!("Time:    {}ms", result.duration_ms);

    if let Some(last) = result.turns.last() {
        println!(
            "Troops:  {} / {} on {} / {} nodes",
            last.first_troops, last.second_troops, last.first_nodes, last.second_nodes
        );
        println!("Ring:    {}", troop_bar(&last.troops));
    }
    if result.end_reason == EndReason::Error {
        if let Some(error) = &result.error {
            println!("Error:   {}", error);
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn troop_bar(troops: &[u32]) -> String {
    troops
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
