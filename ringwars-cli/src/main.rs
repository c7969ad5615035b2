//! RINGWARS CLI - Command-line interface
//!
//! Commands:
//! - turn: Answer one turn of the file-exchange protocol
//! - match: Play a single match between two agents
//! - tournament: Run a round-robin tournament
//! - analysis: Play one agent against a set of opponents and rate it
//! - benchmark: Timed matches between a small fixed roster
//! - quick: Short smoke match for a few agents
//! - agents: List the agent roster

mod analysis_cmd;
mod match_cmd;
mod tournament_cmd;
mod turn_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ringwars_core::AgentKind;

#[derive(Parser)]
#[command(name = "ringwars")]
#[command(about = "RINGWARS ring territory agents and tournaments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read <dir>/<step>.txt and write <dir>/move.txt
    Turn(turn_cmd::TurnArgs),
    /// Play a single match
    Match(match_cmd::MatchArgs),
    /// Run a round-robin tournament
    Tournament(tournament_cmd::TournamentArgs),
    /// Play one agent against each opponent and rate it
    Analysis(analysis_cmd::AnalysisArgs),
    /// One timed match per pair of a small roster
    Benchmark(analysis_cmd::SuiteArgs),
    /// Short match against the random agent for a few agents
    Quick(analysis_cmd::SuiteArgs),
    /// List available agents
    Agents,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Turn(args) => turn_cmd::run(args),
        Commands::Match(args) => match_cmd::run(args),
        Commands::Tournament(args) => tournament_cmd::run(args),
        Commands::Analysis(args) => analysis_cmd::run_analysis(args),
        Commands::Benchmark(args) => analysis_cmd::run_benchmark(args),
        Commands::Quick(args) => analysis_cmd::run_quick(args),
        Commands::Agents => {
            for kind in AgentKind::ALL {
                println!("{:<18} {}", kind.name(), kind.description());
            }
            Ok(())
        }
    }
}
