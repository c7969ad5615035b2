//! Agent evaluation suites built on single matches
//!
//! - analysis: one agent against a list of opponents, with a rating band
//! - benchmark: timed round-robin of a small roster, one match per pair
//! - quick check: each agent plays one short match against the random agent

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use ringwars_core::AgentKind;

use crate::config::MatchConfig;
use crate::match_play::{run_match, MatchResult};

/// Default opponents for an analysis
pub const ANALYSIS_OPPONENTS: [AgentKind; 5] = [
    AgentKind::Random,
    AgentKind::Defensive,
    AgentKind::Aggressive,
    AgentKind::Strategic,
    AgentKind::Learning,
];
pub const ANALYSIS_MATCHES: u32 = 5;

pub const BENCHMARK_AGENTS: [AgentKind; 4] = [
    AgentKind::Random,
    AgentKind::Defensive,
    AgentKind::Aggressive,
    AgentKind::Strategic,
];
pub const BENCHMARK_MAX_TURNS: u32 = 50;

pub const QUICK_AGENTS: [AgentKind; 4] = [
    AgentKind::Random,
    AgentKind::Basic,
    AgentKind::Defensive,
    AgentKind::Aggressive,
];
pub const QUICK_RING_SIZE: usize = 10;
pub const QUICK_MAX_TURNS: u32 = 20;

// ============================================================================
// ANALYSIS
// ============================================================================

/// Performance band from an overall win rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl Rating {
    /// Above 70% excellent, above 50% good, above 30% average
    pub fn from_win_rate(rate: f64) -> Self {
        if rate > 0.7 {
            Rating::Excellent
        } else if rate > 0.5 {
            Rating::Good
        } else if rate > 0.3 {
            Rating::Average
        } else {
            Rating::NeedsImprovement
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::Average => "AVERAGE",
            Rating::NeedsImprovement => "NEEDS IMPROVEMENT",
        };
        f.write_str(s)
    }
}

/// The target's matches against one opponent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub opponent: String,
    pub wins: u32,
    pub results: Vec<MatchResult>,
}

impl OpponentRecord {
    pub fn matches(&self) -> u32 {
        self.results.len() as u32
    }

    pub fn win_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.wins as f64 / self.results.len() as f64
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub target: String,
    pub records: Vec<OpponentRecord>,
}

impl AgentAnalysis {
    pub fn total_wins(&self) -> u32 {
        self.records.iter().map(|r| r.wins).sum()
    }

    pub fn total_matches(&self) -> u32 {
        self.records.iter().map(OpponentRecord::matches).sum()
    }

    pub fn win_rate(&self) -> f64 {
        let matches = self.total_matches();
        if matches == 0 {
            0.0
        } else {
            self.total_wins() as f64 / matches as f64
        }
    }

    pub fn mean_duration_ms(&self) -> f64 {
        let matches = self.total_matches();
        if matches == 0 {
            return 0.0;
        }
        let total: u64 = self
            .records
            .iter()
            .flat_map(|r| &r.results)
            .map(|m| m.duration_ms)
            .sum();
        total as f64 / matches as f64
    }

    pub fn rating(&self) -> Rating {
        Rating::from_win_rate(self.win_rate())
    }
}

/// Play `target` as the first side `matches` times against each opponent.
///
/// The target itself and repeated opponents are skipped. Match seeds run
/// from the config's base seed in play order.
pub fn analyze_agent<F>(
    target: AgentKind,
    opponents: &[AgentKind],
    matches: u32,
    config: &MatchConfig,
    mut on_result: F,
) -> AgentAnalysis
where
    F: FnMut(&MatchResult),
{
    let base = config.base_seed();
    let mut seed_offset = 0u64;
    let mut records: Vec<OpponentRecord> = Vec::new();

    tracing::info!("Starting analysis: {} vs {} opponents", target, opponents.len());

    for &opponent in opponents {
        if opponent == target || records.iter().any(|r| r.opponent == opponent.name()) {
            continue;
        }
        let mut record = OpponentRecord {
            opponent: opponent.name().to_string(),
            wins: 0,
            results: Vec::with_capacity(matches as usize),
        };
        for _ in 0..matches {
            let result = run_match(target, opponent, config, base.wrapping_add(seed_offset));
            seed_offset += 1;
            if result.won_by(target.name()) {
                record.wins += 1;
            }
            on_result(&result);
            record.results.push(result);
        }
        records.push(record);
    }

    AgentAnalysis {
        target: target.name().to_string(),
        records,
    }
}

// ============================================================================
// BENCHMARK AND QUICK CHECK
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub results: Vec<MatchResult>,
    pub total_ms: u64,
}

/// One match per pair of `roster` with the turn limit lowered to 50
pub fn run_benchmark<F>(roster: &[AgentKind], config: &MatchConfig, mut on_result: F) -> BenchmarkReport
where
    F: FnMut(&MatchResult),
{
    let config = MatchConfig {
        max_turns: BENCHMARK_MAX_TURNS,
        ..config.clone()
    };
    let base = config.base_seed();
    let start = Instant::now();
    let mut results = Vec::new();

    for i in 0..roster.len() {
        for j in (i + 1)..roster.len() {
            let seed = base.wrapping_add(results.len() as u64);
            let result = run_match(roster[i], roster[j], &config, seed);
            on_result(&result);
            results.push(result);
        }
    }

    BenchmarkReport {
        results,
        total_ms: start.elapsed().as_millis() as u64,
    }
}

/// Outcome of one agent's smoke match
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuickCheck {
    pub agent: String,
    pub passed: bool,
    pub result: MatchResult,
}

/// Each agent plays one short match against the random agent on a 10-ring;
/// any outcome but an error passes
pub fn run_quick_check(agents: &[AgentKind], config: &MatchConfig) -> Vec<QuickCheck> {
    let config = MatchConfig {
        ring_size: QUICK_RING_SIZE,
        max_turns: QUICK_MAX_TURNS,
        ..config.clone()
    };
    agents
        .iter()
        .map(|&agent| {
            let result = run_match(agent, AgentKind::Random, &config, config.base_seed());
            if result.is_error() {
                tracing::warn!("Quick check failed for {}: {:?}", agent, result.error);
            }
            QuickCheck {
                agent: agent.name().to_string(),
                passed: !result.is_error(),
                result,
            }
        })
        .collect()
}
