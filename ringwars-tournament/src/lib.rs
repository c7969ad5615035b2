//! RINGWARS Tournament - Matches and round-robin tournaments between agents
//!
//! This crate provides tournament infrastructure:
//! - A reference resolution engine for the ring game
//! - Match play from first turn to a terminal outcome
//! - Round-robin tournaments with optional tournament-long agent memory
//! - Agent analysis, benchmark and quick-check suites
//! - CSV export of results
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: schedule, play_match (phases)
//! - Level 3: turn decisions, victory and stalemate checks (steps)
//! - Level 4: utilities, configuration

mod analysis;
mod config;
mod engine;
mod export;
mod match_play;
mod tournament;

pub use analysis::{
    analyze_agent, run_benchmark, run_quick_check, AgentAnalysis, BenchmarkReport, OpponentRecord,
    QuickCheck, Rating, ANALYSIS_MATCHES, ANALYSIS_OPPONENTS, BENCHMARK_AGENTS, QUICK_AGENTS,
};
pub use config::{MatchConfig, SessionScope, TournamentConfig, DEFAULT_SEED};
pub use engine::{Board, EngineError, ResolutionEngine, RingEngine, Side};
pub use export::{export_csv, write_csv, CSV_HEADER};
pub use match_play::{
    is_stalemate, leader, play_match, run_match, run_match_with_sessions, EndReason, MatchResult,
    TurnSnapshot,
};
pub use tournament::{
    compute_stats, dedup_roster, run_tournament, run_tournament_with, schedule, AgentStats, MatchJob,
    TournamentResult,
};
