//! Tournament execution - round-robin between agents
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::hash_map::Entry;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use ringwars_core::{AgentKind, AgentSession};

use crate::config::{MatchConfig, SessionScope, TournamentConfig};
use crate::engine::Side;
use crate::match_play::{run_match, run_match_with_sessions, session_seed, MatchResult};

/// One scheduled match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchJob {
    /// Position in the schedule
    pub index: usize,
    pub first: AgentKind,
    pub second: AgentKind,
    pub seed: u64,
}

/// Aggregated record of one agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub matches: u32,
    pub total_duration_ms: u64,
}

impl AgentStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wins: 0,
            losses: 0,
            matches: 0,
            total_duration_ms: 0,
        }
    }

    /// Win rate
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }

    pub fn mean_duration_ms(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.matches as f64
        }
    }
}

/// Result of a tournament
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Match results in schedule order
    pub results: Vec<MatchResult>,
    /// Per-agent stats in roster order
    pub stats: Vec<AgentStats>,
}

impl TournamentResult {
    /// Agent with the most wins (earliest in the roster on ties)
    pub fn winner(&self) -> Option<&AgentStats> {
        self.stats
            .iter()
            .enumerate()
            .max_by_key(|(i, s)| (s.wins, std::cmp::Reverse(*i)))
            .map(|(_, s)| s)
    }

    /// Stats sorted by win rate (descending)
    pub fn ranked(&self) -> Vec<&AgentStats> {
        let mut ranked: Vec<&AgentStats> = self.stats.iter().collect();
        ranked.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate()));
        ranked
    }

    /// Get stats for a specific agent name
    pub fn standing_for(&self, name: &str) -> Option<&AgentStats> {
        self.stats.iter().find(|s| s.name == name)
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a round-robin tournament (Level 1 orchestration)
///
/// # Arguments
/// * `roster` - Participating agents, in the order stats are reported
/// * `config` - Tournament configuration
///
/// # Returns
/// All match results in schedule order plus per-agent stats
pub fn run_tournament(roster: &[AgentKind], config: &TournamentConfig) -> TournamentResult {
    run_tournament_with(roster, config, |_| {})
}

/// Run a tournament, calling `on_result` as each match finishes
pub fn run_tournament_with<F>(roster: &[AgentKind], config: &TournamentConfig, on_result: F) -> TournamentResult
where
    F: Fn(&MatchResult) + Sync,
{
    let unique = dedup_roster(roster);
    if unique.len() < roster.len() {
        tracing::warn!("Ignoring {} duplicate roster entries", roster.len() - unique.len());
    }
    let roster = unique.as_slice();
    let jobs = schedule(roster, &config.match_config);
    tracing::info!(
        "Starting tournament: {} agents, {} matches ({})",
        roster.len(),
        jobs.len(),
        if config.runs_parallel() { "parallel" } else { "sequential" }
    );

    let results = execute_jobs(&jobs, config, &on_result);
    let stats = compute_stats(roster, &results);
    let result = TournamentResult { results, stats };

    if let Some(best) = result.winner() {
        tracing::info!(
            "Tournament finished: {} leads with {}/{} wins ({} errors)",
            best.name,
            best.wins,
            best.matches,
            result.error_count()
        );
    }
    result
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Roster with repeated agents removed, first occurrence kept
pub fn dedup_roster(roster: &[AgentKind]) -> Vec<AgentKind> {
    let mut seen = FxHashSet::default();
    roster.iter().copied().filter(|kind| seen.insert(*kind)).collect()
}

/// Round-robin schedule (Level 2 phase)
///
/// Every pair `i < j` plays `matches_per_pair` times, plus one reversed match
/// right after the first repetition when enabled.
pub fn schedule(roster: &[AgentKind], config: &MatchConfig) -> Vec<MatchJob> {
    let base = config.base_seed();
    let mut pairs = Vec::new();
    for i in 0..roster.len() {
        for j in (i + 1)..roster.len() {
            for repetition in 0..config.matches_per_pair {
                pairs.push((roster[i], roster[j]));
                if repetition == 0 && config.reverse_matches {
                    pairs.push((roster[j], roster[i]));
                }
            }
        }
    }

    pairs
        .into_iter()
        .enumerate()
        .map(|(index, (first, second))| MatchJob {
            index,
            first,
            second,
            seed: base.wrapping_add(index as u64),
        })
        .collect()
}

/// Execute all jobs, keeping schedule order (Level 2 phase)
fn execute_jobs<F>(jobs: &[MatchJob], config: &TournamentConfig, on_result: &F) -> Vec<MatchResult>
where
    F: Fn(&MatchResult) + Sync,
{
    let match_config = &config.match_config;
    let play = |job: &MatchJob| {
        let result = run_match(job.first, job.second, match_config, job.seed);
        on_result(&result);
        result
    };

    if config.runs_parallel() {
        jobs.par_iter().map(play).collect()
    } else if config.session_scope == SessionScope::Match {
        jobs.iter().map(play).collect()
    } else {
        let mut sessions: FxHashMap<AgentKind, AgentSession> = FxHashMap::default();
        jobs.iter()
            .map(|job| {
                let result = play_with_memory(job, match_config, &mut sessions);
                on_result(&result);
                result
            })
            .collect()
    }
}

/// Play a job with tournament-scoped sessions
fn play_with_memory(
    job: &MatchJob,
    config: &MatchConfig,
    sessions: &mut FxHashMap<AgentKind, AgentSession>,
) -> MatchResult {
    if job.first == job.second {
        return run_match(job.first, job.second, config, job.seed);
    }

    let mut pair = [
        take_session(sessions, job.first, session_seed(job.seed, Side::First)),
        take_session(sessions, job.second, session_seed(job.seed, Side::Second)),
    ];
    let result = run_match_with_sessions(job.first, job.second, config, job.seed, &mut pair);
    let [first, second] = pair;
    sessions.insert(job.first, first);
    sessions.insert(job.second, second);
    result
}

fn take_session(sessions: &mut FxHashMap<AgentKind, AgentSession>, kind: AgentKind, seed: u64) -> AgentSession {
    sessions
        .remove(&kind)
        .unwrap_or_else(|| AgentSession::new(kind.name(), seed))
}

/// Aggregate per-agent stats over all results
pub fn compute_stats(roster: &[AgentKind], results: &[MatchResult]) -> Vec<AgentStats> {
    let mut stats: Vec<AgentStats> = Vec::new();
    let mut slots: FxHashMap<String, usize> = FxHashMap::default();

    let mut slot = |stats: &mut Vec<AgentStats>, name: &str| -> usize {
        match slots.entry(name.to_string()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                stats.push(AgentStats::new(name));
                *e.insert(stats.len() - 1)
            }
        }
    };

    for kind in roster {
        slot(&mut stats, kind.name());
    }

    for result in results {
        // a self-match counts once
        let names = [&result.first, &result.second];
        let distinct = if result.first == result.second { 1 } else { 2 };
        for &name in &names[..distinct] {
            let i = slot(&mut stats, name);
            let entry = &mut stats[i];
            entry.matches += 1;
            entry.total_duration_ms += result.duration_ms;
            if result.won_by(name) {
                entry.wins += 1;
            } else {
                entry.losses += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_play::EndReason;

    fn small_config() -> MatchConfig {
        MatchConfig {
            matches_per_pair: 2,
            ..MatchConfig::new(10, 30)
        }
    }

    fn fake_result(first: &str, second: &str, winner: Option<&str>) -> MatchResult {
        MatchResult {
            first: first.to_string(),
            second: second.to_string(),
            winner: winner.map(str::to_string),
            end_reason: if winner.is_some() { EndReason::Victory } else { EndReason::Error },
            final_turn: 5,
            duration_ms: 10,
            turns: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn test_schedule_reverses_once_per_pair() {
        let roster = [AgentKind::Random, AgentKind::Defensive, AgentKind::Border];
        let jobs = schedule(&roster, &small_config());

        // 3 pairs x (2 + 1 reversed)
        assert_eq!(jobs.len(), 9);
        assert_eq!((jobs[0].first, jobs[0].second), (AgentKind::Random, AgentKind::Defensive));
        assert_eq!((jobs[1].first, jobs[1].second), (AgentKind::Defensive, AgentKind::Random));
        assert_eq!((jobs[2].first, jobs[2].second), (AgentKind::Random, AgentKind::Defensive));

        let reversed = jobs
            .iter()
            .filter(|j| j.first == AgentKind::Border && j.second == AgentKind::Defensive)
            .count();
        assert_eq!(reversed, 1);

        for (i, job) in jobs.iter().enumerate() {
            assert_eq!(job.index, i);
            assert_eq!(job.seed, 42 + i as u64);
        }
    }

    #[test]
    fn test_schedule_without_reverse() {
        let config = MatchConfig {
            reverse_matches: false,
            ..small_config()
        };
        let roster = [AgentKind::Random, AgentKind::Defensive, AgentKind::Border];
        assert_eq!(schedule(&roster, &config).len(), 6);
        assert!(schedule(&roster[..1], &config).is_empty());
    }

    #[test]
    fn test_compute_stats() {
        let roster = [AgentKind::Random, AgentKind::Basic];
        let results = vec![
            fake_result("RandomAgent", "Agent", Some("Agent")),
            fake_result("Agent", "RandomAgent", Some("Agent")),
            fake_result("RandomAgent", "Agent", None),
            fake_result("RandomAgent", "GhostAgent", Some("RandomAgent")),
        ];
        let stats = compute_stats(&roster, &results);

        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["RandomAgent", "Agent", "GhostAgent"]);
        assert_eq!((stats[0].wins, stats[0].matches), (1, 4));
        assert_eq!((stats[1].wins, stats[1].matches), (2, 3));
        assert_eq!(stats[0].total_duration_ms, 40);
        assert!((stats[1].win_rate() - 2.0 / 3.0).abs() < 1e-9);
        for s in &stats {
            assert_eq!(s.wins + s.losses, s.matches);
        }
    }

    #[test]
    fn test_self_match_counts_once() {
        let results = vec![fake_result("BorderAgent", "BorderAgent", Some("BorderAgent"))];
        let stats = compute_stats(&[AgentKind::Border], &results);
        assert_eq!(stats.len(), 1);
        assert_eq!((stats[0].wins, stats[0].losses, stats[0].matches), (1, 0, 1));
    }

    #[test]
    fn test_duplicate_roster_entries_are_ignored() {
        let roster = [AgentKind::Border, AgentKind::Random, AgentKind::Border];
        assert_eq!(dedup_roster(&roster), [AgentKind::Border, AgentKind::Random]);

        let config = MatchConfig {
            matches_per_pair: 1,
            reverse_matches: false,
            ..MatchConfig::new(10, 20)
        };
        let result = run_tournament(&roster, &TournamentConfig::new(config.clone()));
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.stats.len(), 2);
        for s in &result.stats {
            assert_eq!(s.matches, 1);
            assert_eq!(s.wins + s.losses, s.matches);
        }

        let single = run_tournament(&[AgentKind::Border, AgentKind::Border], &TournamentConfig::new(config));
        assert!(single.results.is_empty());
        assert_eq!(single.stats[0].matches, 0);
    }

    #[test]
    fn test_stats_without_matches() {
        let stats = compute_stats(&[AgentKind::Cluster], &[]);
        assert_eq!(stats[0].win_rate(), 0.0);
        assert_eq!(stats[0].mean_duration_ms(), 0.0);
    }

    #[test]
    fn test_run_tournament() {
        let roster = [AgentKind::Random, AgentKind::Expander, AgentKind::Conservative];
        let config = TournamentConfig::new(small_config());
        let result = run_tournament(&roster, &config);

        assert_eq!(result.results.len(), 9);
        assert_eq!(result.stats.len(), 3);
        for s in &result.stats {
            assert_eq!(s.matches, 6);
            assert_eq!(s.wins + s.losses, s.matches);
        }
        let total_wins: u32 = result.stats.iter().map(|s| s.wins).sum();
        assert_eq!(total_wins as usize, result.results.len() - result.error_count());
        assert!(result.winner().is_some());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let roster = [AgentKind::Aggressive, AgentKind::Cluster];
        let parallel = run_tournament(&roster, &TournamentConfig::new(small_config()));
        let sequential = run_tournament(&roster, &TournamentConfig::new(small_config()).sequential());
        assert_eq!(parallel.results.len(), sequential.results.len());
        for (a, b) in parallel.results.iter().zip(&sequential.results) {
            assert_eq!(a.first, b.first);
            assert_eq!(a.turns, b.turns);
        }
    }

    #[test]
    fn test_tournament_memory_keeps_sessions() {
        let roster = [AgentKind::Adaptive, AgentKind::Learning];
        let config = TournamentConfig::new(small_config()).with_tournament_memory();
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let result = run_tournament_with(&roster, &config, |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(counter.into_inner(), 3);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[1].first, "LearningAgent");
    }
}
